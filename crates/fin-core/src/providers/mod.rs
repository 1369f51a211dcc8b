//! Provider abstractions
//!
//! Each external data source (bank aggregator, brokerage, credit bureau, tax
//! data vendor, market data feed) is accessed through one of these traits.
//! Concrete adapters live with their domain (e.g. `credit::ExperianProvider`)
//! or are supplied by the host application.
//!
//! All traits are `Send + Sync` so providers can be shared across handlers
//! as `Arc<dyn Trait>`.

mod feed;
mod mock;

pub use feed::{parse_transactions_csv, StaticTransactionFeed};
pub use mock::MockTransactionFeed;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::credit::{CreditReport, CreditScore};
use crate::error::Result;
use crate::models::{Candle, OrderRequest, Quote, Transaction};

/// Source of a user's transactions over a date range (inclusive)
#[async_trait]
pub trait TransactionFeed: Send + Sync {
    async fn transactions(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>>;
}

/// Equity market data
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<Quote>;

    /// Historical bars, e.g. `period = "1mo"`, `interval = "1d"`
    async fn history(&self, symbol: &str, period: &str, interval: &str) -> Result<Vec<Candle>>;
}

/// Crypto market data
#[async_trait]
pub trait CryptoDataProvider: Send + Sync {
    async fn ticker(&self, symbol_pair: &str) -> Result<Quote>;

    async fn ohlcv(&self, symbol_pair: &str, timeframe: &str, limit: usize)
        -> Result<Vec<Candle>>;
}

/// Bank account aggregation (link-token style onboarding)
#[async_trait]
pub trait BankingProvider: Send + Sync {
    async fn create_link_token(&self, user_id: &str) -> Result<String>;

    async fn exchange_public_token(&self, public_token: &str) -> Result<Value>;

    async fn accounts(&self, access_token: &str) -> Result<Vec<Value>>;
}

/// Order routing and positions
#[async_trait]
pub trait BrokerageProvider: Send + Sync {
    async fn submit_order(&self, order: &OrderRequest) -> Result<Value>;

    async fn positions(&self) -> Result<Vec<Value>>;
}

/// Identity verification (KYC)
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_verification_session(&self, params: Value) -> Result<Value>;

    async fn get_verification_session(&self, session_id: &str) -> Result<Value>;
}

/// Credit bureau access
#[async_trait]
pub trait CreditProvider: Send + Sync {
    /// Bureau identifier, e.g. "experian"
    fn bureau(&self) -> &'static str;

    async fn get_credit_score(&self, user_id: &str) -> Result<CreditScore>;

    async fn get_credit_report(&self, user_id: &str) -> Result<CreditReport>;

    /// Register a webhook for score changes, returning the subscription ID
    async fn subscribe_to_changes(&self, user_id: &str, webhook_url: &str) -> Result<String>;
}

/// Tax documents and crypto gains
#[async_trait]
pub trait TaxProvider: Send + Sync {
    /// Tax forms for a user and tax year
    async fn get_tax_forms(&self, user_id: &str, tax_year: i32) -> Result<Vec<Value>>;

    /// A specific tax document by ID
    async fn get_tax_document(&self, document_id: &str) -> Result<Value>;

    /// Capital gains from crypto transactions
    async fn calculate_crypto_gains(&self, transactions: &[Value]) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::OrderSide;
    use std::sync::{Arc, Mutex};

    /// In-memory brokerage used to check the trait is object safe
    #[derive(Default)]
    struct PaperBroker {
        orders: Mutex<Vec<OrderRequest>>,
    }

    #[async_trait]
    impl BrokerageProvider for PaperBroker {
        async fn submit_order(&self, order: &OrderRequest) -> Result<Value> {
            if order.qty <= 0.0 {
                return Err(Error::InvalidData("qty must be positive".to_string()));
            }
            let mut orders = self.orders.lock().unwrap();
            orders.push(order.clone());
            Ok(serde_json::json!({
                "id": format!("ord_{}", orders.len()),
                "symbol": order.symbol,
                "status": "accepted",
            }))
        }

        async fn positions(&self) -> Result<Vec<Value>> {
            let orders = self.orders.lock().unwrap();
            Ok(orders
                .iter()
                .map(|o| {
                    let signed = match o.side {
                        OrderSide::Buy => o.qty,
                        OrderSide::Sell => -o.qty,
                    };
                    serde_json::json!({ "symbol": o.symbol, "qty": signed })
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_brokerage_trait_object() {
        let broker: Arc<dyn BrokerageProvider> = Arc::new(PaperBroker::default());
        let order = OrderRequest {
            symbol: "VTI".to_string(),
            qty: 2.0,
            side: OrderSide::Buy,
            order_type: "market".to_string(),
            time_in_force: "day".to_string(),
        };

        let ack = broker.submit_order(&order).await.unwrap();
        assert_eq!(ack["status"], "accepted");

        let positions = broker.positions().await.unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0]["qty"], 2.0);

        let bad = OrderRequest { qty: 0.0, ..order };
        assert!(broker.submit_order(&bad).await.is_err());
    }
}
