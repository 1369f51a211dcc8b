//! Credit bureau records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A credit score pulled from one bureau
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditScore {
    pub user_id: String,
    /// 300-850
    pub score: u16,
    /// e.g. "FICO 8", "VantageScore 3.0"
    pub score_model: String,
    pub bureau: String,
    pub score_date: NaiveDate,
    /// Factors the bureau says drive the score
    #[serde(default)]
    pub factors: Vec<String>,
    /// Points changed since the previous pull
    pub change: Option<i32>,
}

/// A tradeline on a credit report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditAccount {
    pub account_id: String,
    /// credit_card, auto_loan, student_loan, mortgage, ...
    pub account_type: String,
    pub creditor_name: String,
    pub account_status: String,
    pub balance: f64,
    pub credit_limit: Option<f64>,
    pub payment_status: String,
    pub opened_date: Option<NaiveDate>,
    pub last_payment_date: Option<NaiveDate>,
    pub monthly_payment: Option<f64>,
}

impl CreditAccount {
    /// Balance as a percentage of the limit, for revolving accounts
    pub fn utilization_percent(&self) -> Option<f64> {
        self.credit_limit
            .filter(|limit| *limit > 0.0)
            .map(|limit| self.balance / limit * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditInquiry {
    pub inquiry_id: String,
    /// "hard" or "soft"
    pub inquiry_type: String,
    pub inquirer_name: String,
    pub inquiry_date: NaiveDate,
    pub purpose: Option<String>,
}

/// Bankruptcy, lien, judgment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicRecord {
    pub record_id: String,
    pub record_type: String,
    pub filed_date: NaiveDate,
    pub status: String,
    pub amount: Option<f64>,
    pub court: Option<String>,
}

/// Full credit report from one bureau
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditReport {
    pub user_id: String,
    pub bureau: String,
    pub report_date: NaiveDate,
    pub score: CreditScore,
    #[serde(default)]
    pub accounts: Vec<CreditAccount>,
    #[serde(default)]
    pub inquiries: Vec<CreditInquiry>,
    #[serde(default)]
    pub public_records: Vec<PublicRecord>,
    #[serde(default)]
    pub consumer_statements: Vec<String>,
}

impl CreditReport {
    /// Overall revolving utilization across accounts with a limit
    pub fn total_utilization_percent(&self) -> Option<f64> {
        let (balance, limit) = self
            .accounts
            .iter()
            .filter_map(|a| a.credit_limit.map(|l| (a.balance, l)))
            .fold((0.0, 0.0), |(b, l), (ab, al)| (b + ab, l + al));

        if limit > 0.0 {
            Some(balance / limit * 100.0)
        } else {
            None
        }
    }
}
