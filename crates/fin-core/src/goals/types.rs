//! Goal records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Savings,
    Debt,
    Investment,
    NetWorth,
    Income,
    Custom,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Debt => "debt",
            Self::Investment => "investment",
            Self::NetWorth => "net_worth",
            Self::Income => "income",
            Self::Custom => "custom",
        }
    }
}

impl std::str::FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "savings" => Ok(Self::Savings),
            "debt" => Ok(Self::Debt),
            "investment" => Ok(Self::Investment),
            "net_worth" | "networth" => Ok(Self::NetWorth),
            "income" => Ok(Self::Income),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("Unknown goal type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Paused,
    Completed,
    Abandoned,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }
}

/// Intermediate checkpoint on the way to a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub amount: f64,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reached: bool,
    #[serde(default)]
    pub reached_date: Option<NaiveDate>,
}

/// Share of contributions routed from one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingSource {
    pub account_id: String,
    pub allocation_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    #[serde(default = "new_goal_id")]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub goal_type: GoalType,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub status: GoalStatus,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub funding_sources: Vec<FundingSource>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn new_goal_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("goal_{}", &hex[..12])
}

impl Goal {
    /// An active goal with nothing saved yet
    pub fn new(user_id: &str, name: &str, goal_type: GoalType, target_amount: f64) -> Self {
        Self {
            id: new_goal_id(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            goal_type,
            target_amount,
            current_amount: 0.0,
            deadline: None,
            status: GoalStatus::Active,
            milestones: Vec::new(),
            funding_sources: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal_id: String,
    pub current_amount: f64,
    pub target_amount: f64,
    /// Capped at 100
    pub percent_complete: f64,
    pub remaining: f64,
    /// Needed per month to hit the deadline; `None` without a deadline
    pub monthly_required: Option<f64>,
    pub on_track: bool,
    pub projected_completion: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}
