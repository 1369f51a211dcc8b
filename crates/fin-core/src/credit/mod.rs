//! Credit bureau access
//!
//! `ExperianProvider` serves fixed sample data for development; when client
//! credentials are configured it also performs the real OAuth token exchange
//! so the auth path is exercised end to end. `easy_credit` builds a provider
//! from explicit settings with environment variable fallbacks.
//!
//! Every score or report access should be recorded in the audit log under
//! [`SCORE_ACCESSED_EVENT`] / [`REPORT_ACCESSED_EVENT`].

mod auth;
mod cache;
mod types;

pub use auth::{ExperianAuthManager, DEFAULT_TOKEN_TTL_SECS};
pub use cache::{ResponseCache, DEFAULT_CACHE_TTL};
pub use types::*;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::providers::CreditProvider;

pub const SCORE_ACCESSED_EVENT: &str = "credit.score_accessed";
pub const REPORT_ACCESSED_EVENT: &str = "credit.report_accessed";

/// Bureau API environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }

    /// Experian API base URL for this environment
    pub fn experian_base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://sandbox-us-api.experian.com",
            Self::Production => "https://us-api.experian.com",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            _ => Err(Error::InvalidData(format!(
                "Unknown credit environment: {} (expected sandbox or production)",
                s
            ))),
        }
    }
}

/// Explicit provider settings; unset fields fall back to `EXPERIAN_*` env vars
#[derive(Debug, Clone, Default)]
pub struct CreditConfig {
    pub api_key: Option<String>,
    pub environment: Option<Environment>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub base_url: Option<String>,
}

impl CreditConfig {
    /// Fill unset fields from the environment
    fn with_env_fallbacks(mut self) -> Result<Self> {
        fn env(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty())
        }

        self.api_key = self.api_key.or_else(|| env("EXPERIAN_API_KEY"));
        self.client_id = self.client_id.or_else(|| env("EXPERIAN_CLIENT_ID"));
        self.client_secret = self
            .client_secret
            .or_else(|| env("EXPERIAN_CLIENT_SECRET"));
        self.base_url = self.base_url.or_else(|| env("EXPERIAN_BASE_URL"));
        if self.environment.is_none() {
            self.environment = env("EXPERIAN_ENVIRONMENT")
                .map(|e| e.parse())
                .transpose()?;
        }
        Ok(self)
    }
}

/// Build a credit provider for `bureau`
pub fn easy_credit(bureau: &str, config: CreditConfig) -> Result<Arc<dyn CreditProvider>> {
    match bureau.trim().to_lowercase().as_str() {
        "experian" => {
            let config = config.with_env_fallbacks()?;
            Ok(Arc::new(ExperianProvider::from_config(config)))
        }
        "equifax" => Err(Error::NotImplemented(
            "Equifax provider not implemented yet".to_string(),
        )),
        "transunion" => Err(Error::NotImplemented(
            "TransUnion provider not implemented yet".to_string(),
        )),
        _ => Err(Error::InvalidData(format!(
            "Unknown credit provider: {}",
            bureau
        ))),
    }
}

/// Experian credit provider (sample data)
pub struct ExperianProvider {
    api_key: Option<String>,
    environment: Environment,
    auth: Option<ExperianAuthManager>,
}

impl ExperianProvider {
    pub fn new(api_key: Option<String>, environment: Environment) -> Self {
        Self {
            api_key,
            environment,
            auth: None,
        }
    }

    /// Build from settings; OAuth is enabled when both client credentials are set
    pub fn from_config(config: CreditConfig) -> Self {
        let environment = config.environment.unwrap_or_default();
        let base_url = config
            .base_url
            .unwrap_or_else(|| environment.experian_base_url().to_string());

        let auth = match (config.client_id, config.client_secret) {
            (Some(id), Some(secret)) => Some(ExperianAuthManager::new(&id, &secret, &base_url)),
            _ => None,
        };

        Self {
            api_key: config.api_key,
            environment,
            auth,
        }
    }

    pub fn with_auth(mut self, auth: ExperianAuthManager) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn has_auth(&self) -> bool {
        self.auth.is_some()
    }

    /// Acquire a bearer token when OAuth is configured
    async fn authorize(&self) -> Result<()> {
        if let Some(auth) = &self.auth {
            auth.get_token().await?;
            debug!(environment = self.environment.as_str(), "Authorized bureau request");
        }
        Ok(())
    }

    fn sample_score(&self, user_id: &str, today: NaiveDate) -> CreditScore {
        CreditScore {
            user_id: user_id.to_string(),
            score: 735,
            score_model: "FICO 8".to_string(),
            bureau: self.bureau().to_string(),
            score_date: today,
            factors: vec![
                "Credit card utilization is high (35%)".to_string(),
                "No recent late payments".to_string(),
                "Average age of accounts is good (8 years)".to_string(),
                "Credit mix is diverse".to_string(),
                "Recent hard inquiry detected".to_string(),
            ],
            change: Some(15),
        }
    }
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn sample_account(
    account_id: &str,
    account_type: &str,
    creditor_name: &str,
    balance: f64,
    credit_limit: Option<f64>,
    opened_date: Option<NaiveDate>,
    monthly_payment: f64,
) -> CreditAccount {
    CreditAccount {
        account_id: account_id.to_string(),
        account_type: account_type.to_string(),
        creditor_name: creditor_name.to_string(),
        account_status: "open".to_string(),
        balance,
        credit_limit,
        payment_status: "current".to_string(),
        opened_date,
        last_payment_date: date(2025, 1, 1),
        monthly_payment: Some(monthly_payment),
    }
}

fn sample_inquiry(id: &str, inquirer: &str, on: NaiveDate, purpose: &str) -> CreditInquiry {
    CreditInquiry {
        inquiry_id: id.to_string(),
        inquiry_type: "hard".to_string(),
        inquirer_name: inquirer.to_string(),
        inquiry_date: on,
        purpose: Some(purpose.to_string()),
    }
}

#[async_trait]
impl CreditProvider for ExperianProvider {
    fn bureau(&self) -> &'static str {
        "experian"
    }

    async fn get_credit_score(&self, user_id: &str) -> Result<CreditScore> {
        self.authorize().await?;
        info!(user_id, bureau = self.bureau(), "Credit score pulled");
        Ok(self.sample_score(user_id, Utc::now().date_naive()))
    }

    async fn get_credit_report(&self, user_id: &str) -> Result<CreditReport> {
        self.authorize().await?;
        let today = Utc::now().date_naive();

        let accounts = vec![
            sample_account(
                "acc_cc_chase",
                "credit_card",
                "Chase Bank",
                3500.0,
                Some(10000.0),
                date(2018, 3, 15),
                150.0,
            ),
            sample_account(
                "acc_auto_ford",
                "auto_loan",
                "Ford Motor Credit",
                12000.0,
                None,
                date(2022, 6, 1),
                450.0,
            ),
            sample_account(
                "acc_student_navient",
                "student_loan",
                "Navient",
                25000.0,
                None,
                date(2015, 9, 1),
                300.0,
            ),
        ];

        let mut inquiries = Vec::new();
        if let Some(on) = date(2025, 1, 1) {
            inquiries.push(sample_inquiry(
                "inq_chase_2025",
                "Chase Bank",
                on,
                "credit_card_application",
            ));
        }
        if let Some(on) = date(2024, 12, 15) {
            inquiries.push(sample_inquiry(
                "inq_ford_2024",
                "Ford Motor Credit",
                on,
                "auto_loan",
            ));
        }

        info!(user_id, bureau = self.bureau(), "Credit report pulled");
        Ok(CreditReport {
            user_id: user_id.to_string(),
            bureau: self.bureau().to_string(),
            report_date: today,
            score: self.sample_score(user_id, today),
            accounts,
            inquiries,
            public_records: Vec::new(),
            consumer_statements: Vec::new(),
        })
    }

    async fn subscribe_to_changes(&self, user_id: &str, webhook_url: &str) -> Result<String> {
        self.authorize().await?;
        info!(user_id, webhook_url, "Subscribed to credit score changes");
        Ok(format!("sub_mock_{}", user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockOAuthServer, MOCK_CLIENT_ID, MOCK_CLIENT_SECRET};

    #[tokio::test]
    async fn test_sample_score() {
        let provider = ExperianProvider::new(None, Environment::Sandbox);
        let score = provider.get_credit_score("user123").await.unwrap();

        assert_eq!(score.user_id, "user123");
        assert_eq!(score.score, 735);
        assert_eq!(score.score_model, "FICO 8");
        assert_eq!(score.bureau, "experian");
        assert_eq!(score.factors.len(), 5);
        assert_eq!(score.change, Some(15));
    }

    #[tokio::test]
    async fn test_sample_report() {
        let provider = ExperianProvider::new(Some("key".into()), Environment::Production);
        let report = provider.get_credit_report("user123").await.unwrap();

        assert_eq!(report.accounts.len(), 3);
        assert_eq!(report.accounts[0].creditor_name, "Chase Bank");
        let utilization = report.accounts[0].utilization_percent().unwrap();
        assert!((utilization - 35.0).abs() < 1e-9);
        assert_eq!(report.accounts[1].credit_limit, None);
        assert_eq!(report.inquiries.len(), 2);
        assert!(report.inquiries.iter().all(|i| i.inquiry_type == "hard"));
        assert!(report.public_records.is_empty());
        assert!(report.consumer_statements.is_empty());
        assert_eq!(report.score.score, 735);
        let total = report.total_utilization_percent().unwrap();
        assert!((total - 35.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_subscribe() {
        let provider = ExperianProvider::new(None, Environment::Sandbox);
        let id = provider
            .subscribe_to_changes("user123", "https://example.com/hook")
            .await
            .unwrap();
        assert_eq!(id, "sub_mock_user123");
    }

    #[tokio::test]
    async fn test_oauth_used_when_configured() {
        let server = MockOAuthServer::start().await;
        let provider = ExperianProvider::from_config(CreditConfig {
            client_id: Some(MOCK_CLIENT_ID.to_string()),
            client_secret: Some(MOCK_CLIENT_SECRET.to_string()),
            base_url: Some(server.url()),
            ..Default::default()
        });
        assert!(provider.has_auth());

        provider.get_credit_score("u").await.unwrap();
        provider.get_credit_report("u").await.unwrap();
        assert_eq!(server.token_requests(), 1);
    }

    #[tokio::test]
    async fn test_oauth_failure_propagates() {
        let server = MockOAuthServer::start().await;
        let provider = ExperianProvider::new(None, Environment::Sandbox).with_auth(
            ExperianAuthManager::new(MOCK_CLIENT_ID, "nope", &server.url()),
        );
        let err = provider.get_credit_score("u").await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_easy_credit_bureaus() {
        let provider = easy_credit(
            "Experian",
            CreditConfig {
                environment: Some(Environment::Sandbox),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(provider.bureau(), "experian");

        let err = easy_credit("equifax", CreditConfig::default()).err().unwrap();
        assert!(matches!(err, Error::NotImplemented(_)));
        let err = easy_credit("transunion", CreditConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, Error::NotImplemented(_)));

        let err = easy_credit("acme", CreditConfig::default()).err().unwrap();
        assert_eq!(err.to_string(), "Unknown credit provider: acme");
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("Production".parse::<Environment>().unwrap(), Environment::Production);
        assert!("staging".parse::<Environment>().is_err());
        assert_eq!(
            Environment::default().experian_base_url(),
            "https://sandbox-us-api.experian.com"
        );
    }
}
