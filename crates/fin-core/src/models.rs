//! Shared domain models for fin-infra
//!
//! Domain-specific records live next to their logic (`budgets::types`,
//! `credit::types`, `goals::types`, `analytics::types`). This module holds the
//! records every provider speaks: transactions, quotes and candles.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A normalized bank/card transaction
///
/// Negative amounts are expenses, positive amounts are income or refunds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: Option<String>,
    /// Category attached by the provider, if it categorizes for us
    #[serde(default)]
    pub category: Option<String>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

/// A point-in-time price quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub as_of: DateTime<Utc>,
}

/// One OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub ts: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Order side for brokerage submissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl std::str::FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            _ => Err(format!("Unknown order side: {}", s)),
        }
    }
}

/// Brokerage order request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub qty: f64,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: String,
    pub time_in_force: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_is_expense() {
        let tx = Transaction {
            id: "t1".to_string(),
            account_id: "a1".to_string(),
            amount: -12.5,
            date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            description: Some("COFFEE".to_string()),
            category: None,
        };
        assert!(tx.is_expense());

        let refund = Transaction { amount: 12.5, ..tx };
        assert!(!refund.is_expense());
    }

    #[test]
    fn test_order_request_serializes_type_field() {
        let order = OrderRequest {
            symbol: "AAPL".to_string(),
            qty: 1.0,
            side: OrderSide::Buy,
            order_type: "market".to_string(),
            time_in_force: "day".to_string(),
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["type"], "market");
        assert_eq!(json["side"], "buy");
        assert_eq!("SELL".parse::<OrderSide>().unwrap(), OrderSide::Sell);
    }
}
