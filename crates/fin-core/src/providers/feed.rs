//! In-memory transaction feeds
//!
//! `StaticTransactionFeed` serves a fixed list (e.g. a parsed CSV export) so it
//! can be analyzed with the same pipeline as a live aggregator.

use std::io::Read;

use async_trait::async_trait;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use tracing::debug;

use super::TransactionFeed;
use crate::error::{Error, Result};
use crate::models::Transaction;

/// Feed over a fixed transaction list, shared by every user
#[derive(Debug, Clone, Default)]
pub struct StaticTransactionFeed {
    transactions: Vec<Transaction>,
}

impl StaticTransactionFeed {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// Latest transaction date, if any
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.transactions.iter().map(|t| t.date).max()
    }
}

#[async_trait]
impl TransactionFeed for StaticTransactionFeed {
    async fn transactions(
        &self,
        _user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        Ok(self
            .transactions
            .iter()
            .filter(|t| t.date >= start && t.date <= end)
            .cloned()
            .collect())
    }
}

/// Parse a simple CSV export into transactions
///
/// Expected header: `date,description,amount[,category]`. Negative amounts are
/// expenses.
pub fn parse_transactions_csv<R: Read>(reader: R, account_id: &str) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut transactions = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;

        let date_str = record
            .get(0)
            .ok_or_else(|| Error::InvalidData(format!("Row {}: missing date", i + 1)))?;
        let date = parse_date(date_str)?;

        let description = record
            .get(1)
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty());

        let amount_str = record
            .get(2)
            .ok_or_else(|| Error::InvalidData(format!("Row {}: missing amount", i + 1)))?;
        let amount = parse_amount(amount_str)?;

        let category = record
            .get(3)
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty());

        transactions.push(Transaction {
            id: format!("csv_{}", i),
            account_id: account_id.to_string(),
            amount,
            date,
            description,
            category,
        });
    }

    debug!("Parsed {} CSV transactions", transactions.len());
    Ok(transactions)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::InvalidData(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s.trim().replace(['$', ',', ' '], "");

    cleaned
        .parse::<f64>()
        .map_err(|_| Error::InvalidData(format!("Unable to parse amount: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "date,description,amount,category
2025-03-01,SAFEWAY GROCERIES,-42.10,
03/02/2025,PAYROLL DEPOSIT,\"$2,500.00\",Income
2025-03-05,UBER TRIP,-18.00,Transportation
";

    #[test]
    fn test_parse_transactions_csv() {
        let txs = parse_transactions_csv(CSV.as_bytes(), "checking").unwrap();
        assert_eq!(txs.len(), 3);

        assert_eq!(txs[0].amount, -42.10);
        assert_eq!(txs[0].category, None);
        assert_eq!(txs[0].account_id, "checking");

        assert_eq!(txs[1].amount, 2500.0);
        assert_eq!(txs[1].date, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());

        assert_eq!(txs[2].category.as_deref(), Some("Transportation"));
    }

    #[test]
    fn test_parse_transactions_csv_bad_amount() {
        let bad = "date,description,amount\n2025-03-01,X,abc\n";
        let err = parse_transactions_csv(bad.as_bytes(), "a").unwrap_err();
        assert!(err.to_string().contains("Unable to parse amount"));
    }

    #[tokio::test]
    async fn test_static_feed_filters_range() {
        let txs = parse_transactions_csv(CSV.as_bytes(), "checking").unwrap();
        let feed = StaticTransactionFeed::new(txs);
        assert_eq!(
            feed.latest_date(),
            Some(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap())
        );

        let first_two_days = feed
            .transactions(
                "anyone",
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(first_two_days.len(), 2);
    }
}
