//! Mock transaction feed
//!
//! Stands in for a bank aggregator until a real one is wired up. Every user
//! sees the same fixed set of expenses, dated relative to today.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use tracing::debug;

use super::TransactionFeed;
use crate::error::Result;
use crate::models::Transaction;

/// (description, amount, days ago)
const MOCK_EXPENSES: &[(&str, f64, i64)] = &[
    ("AMAZON.COM", -85.00, 2),
    ("SAFEWAY GROCERIES", -120.50, 3),
    ("STARBUCKS CAFE", -5.50, 5),
    ("SHELL GAS STATION", -45.00, 7),
    ("NETFLIX SUBSCRIPTION", -15.99, 10),
    ("TARGET RETAIL", -67.30, 12),
    ("WHOLE FOODS", -95.20, 15),
    ("RESTAURANT DINNER", -75.00, 18),
    ("AMAZON.COM", -150.00, 20),
    ("SAFEWAY GROCERIES", -110.00, 22),
    ("ELECTRIC COMPANY", -85.00, 25),
    ("SPOTIFY PREMIUM", -9.99, 26),
    ("GAS STATION", -50.00, 28),
];

/// Feed returning the built-in mock dataset
#[derive(Debug, Clone)]
pub struct MockTransactionFeed {
    /// Date the mock offsets are measured from (defaults to today, UTC)
    anchor: Option<NaiveDate>,
}

impl MockTransactionFeed {
    pub fn new() -> Self {
        Self { anchor: None }
    }

    /// Pin "today" so results don't drift with the wall clock
    pub fn anchored_at(date: NaiveDate) -> Self {
        Self { anchor: Some(date) }
    }

    /// All mock transactions, regardless of range
    pub fn all(&self) -> Vec<Transaction> {
        let base = self.anchor.unwrap_or_else(|| Utc::now().date_naive());
        MOCK_EXPENSES
            .iter()
            .enumerate()
            .map(|(i, (description, amount, days_ago))| Transaction {
                id: format!("mock_{}", i),
                account_id: "mock_account".to_string(),
                amount: *amount,
                date: base - Duration::days(*days_ago),
                description: Some(description.to_string()),
                category: None,
            })
            .collect()
    }
}

impl Default for MockTransactionFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionFeed for MockTransactionFeed {
    async fn transactions(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let txs: Vec<Transaction> = self
            .all()
            .into_iter()
            .filter(|t| t.date >= start && t.date <= end)
            .collect();
        debug!(user_id, %start, %end, count = txs.len(), "Serving mock transactions");
        Ok(txs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_feed_respects_range() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let feed = MockTransactionFeed::anchored_at(today);

        let week = feed
            .transactions("user123", today - Duration::days(7), today)
            .await
            .unwrap();
        // 2, 3, 5 and 7 days ago
        assert_eq!(week.len(), 4);
        assert!(week.iter().all(|t| t.account_id == "mock_account"));

        let month = feed
            .transactions("user123", today - Duration::days(30), today)
            .await
            .unwrap();
        assert_eq!(month.len(), 13);
        assert_eq!(month[0].id, "mock_0");
        assert_eq!(month[0].date, today - Duration::days(2));
    }

    #[tokio::test]
    async fn test_mock_feed_empty_before_data() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let feed = MockTransactionFeed::anchored_at(today);
        let old = feed
            .transactions("u", today - Duration::days(90), today - Duration::days(29))
            .await
            .unwrap();
        assert!(old.is_empty());
    }
}
