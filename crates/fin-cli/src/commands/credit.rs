//! Credit bureau commands

use anyhow::{Context, Result};
use fin_core::credit::{easy_credit, CreditConfig};

pub async fn cmd_credit_score(bureau: &str, user: &str) -> Result<()> {
    let provider = easy_credit(bureau, CreditConfig::default())
        .with_context(|| format!("Failed to set up {} provider", bureau))?;

    let score = provider.get_credit_score(user).await?;

    println!(
        "💳 {} score for {}: {} ({})",
        score.bureau, score.user_id, score.score, score.score_model
    );
    if let Some(change) = score.change {
        println!("   Change since last pull: {:+}", change);
    }
    for factor in &score.factors {
        println!("   • {}", factor);
    }

    Ok(())
}

pub async fn cmd_credit_report(bureau: &str, user: &str, json: bool) -> Result<()> {
    let provider = easy_credit(bureau, CreditConfig::default())
        .with_context(|| format!("Failed to set up {} provider", bureau))?;

    let report = provider.get_credit_report(user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "📄 {} report for {} ({})",
        report.bureau,
        report.user_id,
        report.report_date.format("%Y-%m-%d")
    );
    println!("   Score: {} ({})", report.score.score, report.score.score_model);
    println!();
    println!(
        "{:<28} {:<14} {:>10} {:>10}",
        "CREDITOR", "TYPE", "BALANCE", "LIMIT"
    );
    println!("{}", "-".repeat(65));
    for account in &report.accounts {
        let limit = account
            .credit_limit
            .map(|l| format!("{:.2}", l))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<28} {:<14} {:>10.2} {:>10}",
            super::truncate(&account.creditor_name, 28),
            account.account_type,
            account.balance,
            limit
        );
    }
    println!();
    println!(
        "   Inquiries: {}  Public records: {}",
        report.inquiries.len(),
        report.public_records.len()
    );

    Ok(())
}
