//! Spending analytics command

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use fin_core::analytics::{SpendingAnalyzer, SpendingInsight};
use fin_core::providers::{parse_transactions_csv, MockTransactionFeed, StaticTransactionFeed};

use super::truncate;

/// Run the analysis over a CSV export, or the built-in sample data
///
/// A CSV is analyzed as of its latest transaction so older exports still land
/// inside the period.
pub async fn spending_insight(
    user: &str,
    period: &str,
    categories: Option<&[String]>,
    file: Option<&Path>,
) -> Result<SpendingInsight> {
    match file {
        Some(path) => {
            let reader = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let transactions = parse_transactions_csv(reader, "csv_import")
                .with_context(|| format!("Failed to parse {}", path.display()))?;

            let feed = StaticTransactionFeed::new(transactions);
            let end = feed
                .latest_date()
                .unwrap_or_else(|| Utc::now().date_naive());

            let analyzer = SpendingAnalyzer::new(Arc::new(feed));
            Ok(analyzer.analyze_as_of(user, period, categories, end).await?)
        }
        None => {
            let analyzer = SpendingAnalyzer::new(Arc::new(MockTransactionFeed::new()));
            Ok(analyzer.analyze(user, period, categories).await?)
        }
    }
}

pub async fn cmd_spending(
    user: &str,
    period: &str,
    categories: Option<&[String]>,
    file: Option<&Path>,
    json: bool,
) -> Result<()> {
    let insight = spending_insight(user, period, categories, file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&insight)?);
        return Ok(());
    }

    println!(
        "📊 Spending over the last {} days: ${:.2}",
        insight.period_days, insight.total_spending
    );

    if insight.category_breakdown.is_empty() {
        println!("   No expenses in this period.");
        return Ok(());
    }

    println!();
    println!("{:<20} {:>10}  {}", "CATEGORY", "AMOUNT", "TREND");
    println!("{}", "-".repeat(44));
    for (category, amount) in &insight.category_breakdown {
        let trend = insight
            .spending_trends
            .get(category)
            .map(|t| t.to_string())
            .unwrap_or_default();
        println!("{:<20} {:>10.2}  {}", truncate(category, 20), amount, trend);
    }

    if !insight.top_merchants.is_empty() {
        println!();
        println!("Top merchants:");
        for merchant in &insight.top_merchants {
            println!("  {:<30} ${:.2}", truncate(&merchant.merchant, 30), merchant.amount);
        }
    }

    if !insight.anomalies.is_empty() {
        println!();
        println!("⚠️  Anomalies:");
        for anomaly in &insight.anomalies {
            println!(
                "  [{}] {}: ${:.2} vs ${:.2} average ({:+.1}%)",
                anomaly.severity,
                anomaly.category,
                anomaly.current_amount,
                anomaly.average_amount,
                anomaly.deviation_percent
            );
        }
    }

    Ok(())
}
