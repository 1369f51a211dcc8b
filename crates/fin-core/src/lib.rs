//! fin-infra Core Library
//!
//! Financial infrastructure building blocks:
//! - Spending analytics over a pluggable transaction feed
//! - Budget management with progress tracking, rollover and alerts
//! - Credit bureau access (Experian OAuth, cached scores and reports)
//! - Financial goal validation, progress and planning calculators
//! - Provider traits for banking, brokerage, market data, identity and tax
//! - Scaffolding of persistence models for host applications
//! - Encrypted database for budgets and the access audit log

pub mod analytics;
pub mod budgets;
pub mod credit;
pub mod db;
pub mod error;
pub mod goals;
pub mod models;
pub mod providers;
pub mod scaffold;

/// Test utilities including a mock bureau OAuth server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analytics::{Baseline, SpendingAnalyzer, SpendingInsight};
pub use budgets::{Budget, BudgetProgress, BudgetTracker};
pub use credit::{easy_credit, CreditConfig, CreditReport, CreditScore, ExperianProvider};
pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
pub use goals::{goal_progress, validate_goal, Goal, GoalProgress, GoalValidation};
pub use models::Transaction;
pub use providers::{CreditProvider, TransactionFeed};
