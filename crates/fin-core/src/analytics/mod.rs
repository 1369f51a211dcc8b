//! Spending analytics
//!
//! Merchant extraction, categorization, and the period analyzer that turns a
//! transaction feed into a `SpendingInsight`.

mod categorize;
mod merchant;
mod spending;
mod types;

pub use categorize::{categorize_description, Categorizer, KeywordCategorizer, UNCATEGORIZED};
pub use merchant::extract_merchant_name;
pub use spending::{parse_period, SpendingAnalyzer};
pub use types::*;
