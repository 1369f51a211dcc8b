//! Budget management
//!
//! Budgets allocate an amount per category for a repeating period. The
//! tracker persists them in the database and measures spending against them
//! using a `TransactionFeed`.

mod alerts;
mod templates;
mod tracker;
mod types;

pub use alerts::evaluate_alerts;
pub use templates::{apply_template, builtin_templates, get_template};
pub use tracker::BudgetTracker;
pub use types::*;
