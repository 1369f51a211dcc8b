//! Budget records and request payloads

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// What a budget is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetType {
    Personal,
    Household,
    Business,
    Project,
    Custom,
}

impl BudgetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Household => "household",
            Self::Business => "business",
            Self::Project => "project",
            Self::Custom => "custom",
        }
    }
}

impl std::str::FromStr for BudgetType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "personal" => Ok(Self::Personal),
            "household" => Ok(Self::Household),
            "business" => Ok(Self::Business),
            "project" => Ok(Self::Project),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("Unknown budget type: {}", s)),
        }
    }
}

/// Tracking cycle length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl BudgetPeriod {
    /// Period length in days
    pub fn days(&self) -> i64 {
        match self {
            Self::Weekly => 7,
            Self::Biweekly => 14,
            Self::Monthly => 30,
            Self::Quarterly => 90,
            Self::Yearly => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown budget period: {}", s)),
        }
    }
}

/// A stored budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// "bud_" + 12 hex chars
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub budget_type: BudgetType,
    pub period: BudgetPeriod,
    /// Category name -> budgeted amount per period
    pub categories: BTreeMap<String, f64>,
    pub start_date: DateTime<Utc>,
    /// `start_date` + one period
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub rollover_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn total_budgeted(&self) -> f64 {
        self.categories.values().sum()
    }
}

/// Payload for creating a budget
#[derive(Debug, Clone, Deserialize)]
pub struct NewBudget {
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub budget_type: BudgetType,
    pub period: BudgetPeriod,
    pub categories: BTreeMap<String, f64>,
    /// Defaults to now
    #[serde(default, deserialize_with = "deserialize_opt_datetime")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rollover_enabled: bool,
}

/// Partial update; unset fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetUpdate {
    pub name: Option<String>,
    pub categories: Option<BTreeMap<String, f64>>,
    pub period: Option<BudgetPeriod>,
    pub rollover_enabled: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_opt_datetime")]
    pub start_date: Option<DateTime<Utc>>,
}

impl BudgetUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.categories.is_none()
            && self.period.is_none()
            && self.rollover_enabled.is_none()
            && self.start_date.is_none()
    }
}

/// Progress for one category in the current period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategoryProgress {
    pub category_name: String,
    pub budgeted_amount: f64,
    pub spent_amount: f64,
    pub remaining_amount: f64,
    pub percent_used: f64,
    /// Unspent amount carried from the previous period
    pub rollover_amount: f64,
}

impl BudgetCategoryProgress {
    /// Budgeted plus rollover
    pub fn available(&self) -> f64 {
        self.budgeted_amount + self.rollover_amount
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetProgress {
    pub budget_id: String,
    pub current_period: PeriodWindow,
    pub categories: Vec<BudgetCategoryProgress>,
    pub total_budgeted: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
    pub percent_used: f64,
    pub period_days_elapsed: i64,
    pub period_days_total: i64,
}

/// Pre-built allocation strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetTemplate {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub budget_type: BudgetType,
    pub period: BudgetPeriod,
    /// Category name -> percent of income
    pub categories: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Overspending,
    ApproachingLimit,
    UnusualSpending,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overspending => "overspending",
            Self::ApproachingLimit => "approaching_limit",
            Self::UnusualSpending => "unusual_spending",
        }
    }
}

/// Declared most-severe first so the derived `Ord` puts critical alerts first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub budget_id: String,
    pub category: String,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub spent_amount: f64,
    pub budgeted_amount: f64,
    pub percent_used: f64,
}

/// Alert tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Percent used at which a warning fires
    pub approaching_percent: f64,
    /// Spending above historical average times this is flagged
    pub unusual_multiplier: f64,
    /// Per-category overrides of `approaching_percent`
    #[serde(default)]
    pub per_category: HashMap<String, f64>,
}

impl AlertThresholds {
    pub fn approaching_for(&self, category: &str) -> f64 {
        self.per_category
            .get(category)
            .copied()
            .unwrap_or(self.approaching_percent)
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            approaching_percent: 80.0,
            unusual_multiplier: 1.5,
            per_category: HashMap::new(),
        }
    }
}

/// Parse RFC 3339, or a naive ISO date/date-time taken as UTC
pub fn parse_datetime_flexible(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn deserialize_opt_datetime<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_datetime_flexible(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid datetime: {}", s))),
    }
}
