//! Spending insight types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Direction of category spending vs the previous period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How far a category strays from its historical average
///
/// Variants are declared most-severe first so the derived `Ord` sorts
/// severe anomalies ahead of minor ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    /// 50%+ deviation
    Severe,
    /// 30-50% deviation
    Moderate,
    /// 15-30% deviation
    Minor,
}

impl AnomalySeverity {
    /// Classify an absolute deviation percentage, `None` if unremarkable
    pub fn from_deviation(deviation_percent: f64) -> Option<Self> {
        let abs = deviation_percent.abs();
        if abs >= 50.0 {
            Some(Self::Severe)
        } else if abs >= 30.0 {
            Some(Self::Moderate)
        } else if abs >= 15.0 {
            Some(Self::Minor)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Severe => "severe",
            Self::Moderate => "moderate",
            Self::Minor => "minor",
        }
    }
}

impl std::fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A category whose spending deviates from its average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingAnomaly {
    pub category: String,
    pub current_amount: f64,
    pub average_amount: f64,
    pub deviation_percent: f64,
    pub severity: AnomalySeverity,
}

/// Total spent at one merchant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantSpending {
    pub merchant: String,
    pub amount: f64,
}

/// Result of a spending analysis over one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingInsight {
    /// Highest-spend merchants, largest first
    pub top_merchants: Vec<MerchantSpending>,
    pub category_breakdown: BTreeMap<String, f64>,
    pub spending_trends: BTreeMap<String, TrendDirection>,
    /// Severe first
    pub anomalies: Vec<SpendingAnomaly>,
    pub period_days: u32,
    pub total_spending: f64,
}

pub const DEFAULT_PREVIOUS_RATIO: f64 = 0.9;
pub const DEFAULT_AVERAGE_RATIO: f64 = 0.8;

/// Where trend and anomaly comparison amounts come from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Baseline {
    /// Assume prior spending was a fixed fraction of the current period
    Assumed {
        previous_ratio: f64,
        average_ratio: f64,
    },
    /// Fetch preceding periods from the transaction feed
    History { lookback_periods: u32 },
}

impl Default for Baseline {
    fn default() -> Self {
        Self::Assumed {
            previous_ratio: DEFAULT_PREVIOUS_RATIO,
            average_ratio: DEFAULT_AVERAGE_RATIO,
        }
    }
}

impl std::str::FromStr for Baseline {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "assumed" => Ok(Self::default()),
            "history" => Ok(Self::History {
                lookback_periods: 3,
            }),
            _ => Err(format!("Unknown spending baseline: {}", s)),
        }
    }
}

/// Tunables for `SpendingAnalyzer`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub baseline: Baseline,
    /// Changes smaller than this (in percent) count as stable
    pub trend_threshold_percent: f64,
    pub top_merchants: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            baseline: Baseline::default(),
            trend_threshold_percent: 5.0,
            top_merchants: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_thresholds() {
        assert_eq!(AnomalySeverity::from_deviation(10.0), None);
        assert_eq!(
            AnomalySeverity::from_deviation(15.0),
            Some(AnomalySeverity::Minor)
        );
        assert_eq!(
            AnomalySeverity::from_deviation(-35.0),
            Some(AnomalySeverity::Moderate)
        );
        assert_eq!(
            AnomalySeverity::from_deviation(50.0),
            Some(AnomalySeverity::Severe)
        );
        assert!(AnomalySeverity::Severe < AnomalySeverity::Minor);
    }

    #[test]
    fn test_baseline_from_str() {
        assert_eq!("assumed".parse::<Baseline>().unwrap(), Baseline::default());
        assert_eq!(
            " History ".parse::<Baseline>().unwrap(),
            Baseline::History {
                lookback_periods: 3
            }
        );
        assert!("weekly".parse::<Baseline>().is_err());
    }

    #[test]
    fn test_trend_serializes_lowercase() {
        let json = serde_json::to_string(&TrendDirection::Increasing).unwrap();
        assert_eq!(json, "\"increasing\"");
    }
}
