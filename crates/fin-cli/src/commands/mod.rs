//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - `init` and shared utilities (open_db)
//! - `budgets` - Budget management and progress
//! - `credit` - Credit score and report pulls
//! - `scaffold` - Persistence scaffolding generator
//! - `serve` - Web server command
//! - `spending` - Spending analytics

pub mod budgets;
pub mod core;
pub mod credit;
pub mod scaffold;
pub mod serve;
pub mod spending;

// Re-export command functions for main.rs
pub use budgets::*;
pub use core::*;
pub use credit::*;
pub use scaffold::*;
pub use serve::*;
pub use spending::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
