//! Budget command implementations

use std::sync::Arc;

use anyhow::{Context, Result};
use fin_core::budgets::{
    builtin_templates, parse_datetime_flexible, AlertThresholds, Budget, BudgetTracker,
    BudgetType,
};
use fin_core::db::Database;
use fin_core::providers::MockTransactionFeed;

use super::truncate;

/// Budget tracker over the CLI database and the sample transaction feed
pub fn tracker(db: &Database) -> BudgetTracker {
    BudgetTracker::new(db.clone(), Arc::new(MockTransactionFeed::new()))
}

pub fn cmd_budgets_list(db: &Database, user: &str, budget_type: Option<&str>) -> Result<()> {
    let budget_type: Option<BudgetType> = budget_type
        .map(str::parse)
        .transpose()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let budgets = tracker(db).list_budgets(user, budget_type)?;

    if budgets.is_empty() {
        println!("No budgets for {}.", user);
        return Ok(());
    }

    println!(
        "{:<18} {:<24} {:<10} {:<8} {:>10}",
        "ID", "NAME", "TYPE", "PERIOD", "TOTAL"
    );
    println!("{}", "-".repeat(74));
    for budget in &budgets {
        println!(
            "{:<18} {:<24} {:<10} {:<8} {:>10.2}",
            budget.id,
            truncate(&budget.name, 24),
            budget.budget_type.as_str(),
            budget.period.as_str(),
            budget.total_budgeted()
        );
    }

    Ok(())
}

pub fn cmd_budgets_templates() -> Result<()> {
    for (key, template) in builtin_templates() {
        println!("{} - {}", key, template.name);
        println!("   {}", template.description);
        for (category, percent) in &template.categories {
            println!("   {:<24} {:>5.1}%", category, percent);
        }
        println!();
    }
    Ok(())
}

/// Create a budget from a template, returning it
pub fn create_budget_from_template(
    db: &Database,
    user: &str,
    template: &str,
    income: f64,
    name: Option<String>,
    start: Option<&str>,
) -> Result<Budget> {
    let start_date = start
        .map(|raw| {
            parse_datetime_flexible(raw)
                .with_context(|| format!("Invalid start date: {} (use YYYY-MM-DD)", raw))
        })
        .transpose()?;

    let budget = tracker(db).create_from_template(user, template, income, name, start_date)?;
    db.log_audit(
        "cli",
        "create",
        Some("budget"),
        Some(&budget.id),
        Some(&format!("template={}", template)),
    )?;
    Ok(budget)
}

pub fn cmd_budgets_from_template(
    db: &Database,
    user: &str,
    template: &str,
    income: f64,
    name: Option<String>,
    start: Option<&str>,
) -> Result<()> {
    let budget = create_budget_from_template(db, user, template, income, name, start)?;

    println!("✅ Created budget {} ({})", budget.name, budget.id);
    println!(
        "   {} → {}",
        budget.start_date.format("%Y-%m-%d"),
        budget.end_date.format("%Y-%m-%d")
    );
    for (category, amount) in &budget.categories {
        println!("   {:<24} ${:>10.2}", category, amount);
    }

    Ok(())
}

pub async fn cmd_budgets_progress(db: &Database, id: &str) -> Result<()> {
    let progress = tracker(db).get_budget_progress(id).await?;

    println!(
        "📅 Period {} → {} (day {} of {})",
        progress.current_period.start.format("%Y-%m-%d"),
        progress.current_period.end.format("%Y-%m-%d"),
        progress.period_days_elapsed,
        progress.period_days_total
    );
    println!();
    println!(
        "{:<24} {:>10} {:>10} {:>10} {:>7}",
        "CATEGORY", "BUDGETED", "SPENT", "LEFT", "USED"
    );
    println!("{}", "-".repeat(65));
    for category in &progress.categories {
        println!(
            "{:<24} {:>10.2} {:>10.2} {:>10.2} {:>6.1}%",
            truncate(&category.category_name, 24),
            category.budgeted_amount,
            category.spent_amount,
            category.remaining_amount,
            category.percent_used
        );
    }
    println!("{}", "-".repeat(65));
    println!(
        "{:<24} {:>10.2} {:>10.2} {:>10.2} {:>6.1}%",
        "Total",
        progress.total_budgeted,
        progress.total_spent,
        progress.total_remaining,
        progress.percent_used
    );

    Ok(())
}

pub async fn cmd_budgets_alerts(db: &Database, id: &str, approaching: f64) -> Result<()> {
    let thresholds = AlertThresholds {
        approaching_percent: approaching,
        ..Default::default()
    };
    let alerts = tracker(db).check_budget_alerts(id, &thresholds).await?;

    if alerts.is_empty() {
        println!("✅ No alerts - spending is on track.");
        return Ok(());
    }

    for alert in &alerts {
        println!(
            "[{}] {} ({}): {}",
            alert.severity.as_str(),
            alert.category,
            alert.alert_type.as_str(),
            alert.message
        );
    }

    Ok(())
}

pub fn cmd_budgets_delete(db: &Database, id: &str) -> Result<()> {
    tracker(db).delete_budget(id)?;
    db.log_audit("cli", "delete", Some("budget"), Some(id), None)?;
    println!("🗑️  Deleted budget {}", id);
    Ok(())
}
