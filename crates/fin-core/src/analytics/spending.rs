//! Spending analysis
//!
//! Single pass over a period's transactions: keep expenses, optionally filter
//! by category, total by merchant and category, then score each category's
//! trend and anomaly against a baseline.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta, Utc};
use tracing::{debug, info};

use super::categorize::{Categorizer, KeywordCategorizer};
use super::merchant::extract_merchant_name;
use super::types::{
    AnalyzerConfig, AnomalySeverity, Baseline, MerchantSpending, SpendingAnomaly, SpendingInsight,
    TrendDirection, DEFAULT_AVERAGE_RATIO, DEFAULT_PREVIOUS_RATIO,
};
use crate::error::{Error, Result};
use crate::models::Transaction;
use crate::providers::TransactionFeed;

/// Parse a period like "30d" into a number of days
pub fn parse_period(period: &str) -> Result<u32> {
    let period = period.trim().to_lowercase();
    let invalid = || {
        Error::InvalidData(format!(
            "Invalid period format '{}'. Expected format: '30d'",
            period
        ))
    };

    let digits = period.strip_suffix('d').ok_or_else(invalid)?;
    let days: i64 = digits.trim().parse().map_err(|_| invalid())?;

    if days <= 0 {
        return Err(Error::InvalidData(format!(
            "Period must be positive, got {} days",
            days
        )));
    }

    u32::try_from(days).map_err(|_| invalid())
}

/// Spending analyzer over a transaction feed
#[derive(Clone)]
pub struct SpendingAnalyzer {
    feed: Arc<dyn TransactionFeed>,
    categorizer: Arc<dyn Categorizer>,
    config: AnalyzerConfig,
}

impl SpendingAnalyzer {
    pub fn new(feed: Arc<dyn TransactionFeed>) -> Self {
        Self {
            feed,
            categorizer: Arc::new(KeywordCategorizer::new()),
            config: AnalyzerConfig::default(),
        }
    }

    pub fn with_categorizer(mut self, categorizer: Arc<dyn Categorizer>) -> Self {
        self.categorizer = categorizer;
        self
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze the `period` ending today
    pub async fn analyze(
        &self,
        user_id: &str,
        period: &str,
        categories: Option<&[String]>,
    ) -> Result<SpendingInsight> {
        let today = Utc::now().date_naive();
        self.analyze_as_of(user_id, period, categories, today).await
    }

    /// Analyze the `period` ending on `end`
    pub async fn analyze_as_of(
        &self,
        user_id: &str,
        period: &str,
        categories: Option<&[String]>,
        end: NaiveDate,
    ) -> Result<SpendingInsight> {
        let days = parse_period(period)?;
        let start = days_before(end, i64::from(days))?;

        let transactions = self.feed.transactions(user_id, start, end).await?;
        debug!(
            user_id,
            days,
            count = transactions.len(),
            "Fetched transactions for spending analysis"
        );

        let history = match self.config.baseline {
            Baseline::Assumed { .. } => None,
            Baseline::History { lookback_periods } => Some(
                self.fetch_history(user_id, start, days, lookback_periods, categories)
                    .await?,
            ),
        };

        let insight = self.build_insight(&transactions, days, categories, history.as_ref());
        info!(
            user_id,
            days,
            total = insight.total_spending,
            anomalies = insight.anomalies.len(),
            "Spending analysis complete"
        );
        Ok(insight)
    }

    /// Analyze an in-memory list covering `days` days
    ///
    /// No feed is consulted, so a `History` baseline falls back to the
    /// default assumed ratios.
    pub fn analyze_transactions(
        &self,
        transactions: &[Transaction],
        days: u32,
        categories: Option<&[String]>,
    ) -> SpendingInsight {
        if matches!(self.config.baseline, Baseline::History { .. }) {
            debug!("No feed history for in-memory analysis, using assumed baseline");
        }
        self.build_insight(transactions, days, categories, None)
    }

    /// Per-category totals for each preceding window, most recent first
    ///
    /// The current window `[end - days, end]` spans `days + 1` calendar days,
    /// and so does every history window.
    async fn fetch_history(
        &self,
        user_id: &str,
        current_start: NaiveDate,
        days: u32,
        lookback_periods: u32,
        categories: Option<&[String]>,
    ) -> Result<HistoricalSpending> {
        let days = i64::from(days);
        let span = days + 1;
        let mut windows = Vec::with_capacity(lookback_periods as usize);

        for i in 0..i64::from(lookback_periods) {
            // Windows are adjacent and never share a day
            let offset = i
                .checked_mul(span)
                .and_then(|o| o.checked_add(1))
                .ok_or_else(|| out_of_range(days))?;
            let window_end = days_before(current_start, offset)?;
            let window_start = days_before(window_end, days)?;
            let txs = self
                .feed
                .transactions(user_id, window_start, window_end)
                .await?;
            let expenses = self.filter_expenses(&txs, categories);
            windows.push(category_totals(&expenses));
        }

        Ok(HistoricalSpending { windows })
    }

    fn filter_expenses<'a>(
        &self,
        transactions: &'a [Transaction],
        categories: Option<&[String]>,
    ) -> Vec<(&'a Transaction, String)> {
        transactions
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| (t, self.categorizer.categorize(t)))
            .filter(|(_, category)| match categories {
                Some(wanted) if !wanted.is_empty() => wanted.iter().any(|w| w == category),
                _ => true,
            })
            .collect()
    }

    fn build_insight(
        &self,
        transactions: &[Transaction],
        days: u32,
        categories: Option<&[String]>,
        history: Option<&HistoricalSpending>,
    ) -> SpendingInsight {
        let expenses = self.filter_expenses(transactions, categories);

        let top_merchants = top_merchants(&expenses, self.config.top_merchants);
        let category_breakdown = category_totals(&expenses);
        let total_spending = expenses.iter().map(|(t, _)| t.amount.abs()).sum();

        let (previous, average) = self.baseline_amounts(&category_breakdown, history);

        let spending_trends = category_breakdown
            .iter()
            .map(|(category, current)| {
                let prev = previous.get(category).copied().unwrap_or(0.0);
                (
                    category.clone(),
                    classify_trend(*current, prev, self.config.trend_threshold_percent),
                )
            })
            .collect();

        let mut anomalies: Vec<SpendingAnomaly> = category_breakdown
            .iter()
            .filter_map(|(category, current)| {
                let avg = average.get(category).copied().unwrap_or(0.0);
                detect_anomaly(category, *current, avg)
            })
            .collect();
        // Stable sort keeps category order within a severity
        anomalies.sort_by_key(|a| a.severity);

        SpendingInsight {
            top_merchants,
            category_breakdown,
            spending_trends,
            anomalies,
            period_days: days,
            total_spending,
        }
    }

    /// (previous-period amounts, historical-average amounts) by category
    fn baseline_amounts(
        &self,
        current: &BTreeMap<String, f64>,
        history: Option<&HistoricalSpending>,
    ) -> (HashMap<String, f64>, HashMap<String, f64>) {
        let (previous_ratio, average_ratio) = match (self.config.baseline, history) {
            (Baseline::Assumed {
                previous_ratio,
                average_ratio,
            }, _) => (previous_ratio, average_ratio),
            (Baseline::History { .. }, Some(history)) => {
                return current
                    .keys()
                    .map(|category| {
                        (
                            (category.clone(), history.previous(category)),
                            (category.clone(), history.average(category)),
                        )
                    })
                    .unzip();
            }
            (Baseline::History { .. }, None) => (DEFAULT_PREVIOUS_RATIO, DEFAULT_AVERAGE_RATIO),
        };

        current
            .iter()
            .map(|(category, amount)| {
                (
                    (category.clone(), amount * previous_ratio),
                    (category.clone(), amount * average_ratio),
                )
            })
            .unzip()
    }
}

/// `date - days`, or `InvalidData` when that leaves the calendar
fn days_before(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_sub_signed(delta))
        .ok_or_else(|| out_of_range(days))
}

fn out_of_range(days: i64) -> Error {
    Error::InvalidData(format!(
        "Period of {} days is outside the supported date range",
        days
    ))
}

/// Category totals for preceding windows
struct HistoricalSpending {
    /// Index 0 is the window immediately before the current one
    windows: Vec<BTreeMap<String, f64>>,
}

impl HistoricalSpending {
    fn previous(&self, category: &str) -> f64 {
        self.windows
            .first()
            .and_then(|w| w.get(category))
            .copied()
            .unwrap_or(0.0)
    }

    fn average(&self, category: &str) -> f64 {
        if self.windows.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .windows
            .iter()
            .filter_map(|w| w.get(category))
            .sum();
        sum / self.windows.len() as f64
    }
}

fn category_totals(expenses: &[(&Transaction, String)]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for (t, category) in expenses {
        *totals.entry(category.clone()).or_insert(0.0) += t.amount.abs();
    }
    totals
}

/// Merchants by total spend, largest first; ties keep first-seen order
fn top_merchants(expenses: &[(&Transaction, String)], limit: usize) -> Vec<MerchantSpending> {
    let mut merchants: Vec<MerchantSpending> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (t, _) in expenses {
        let name = extract_merchant_name(t.description.as_deref().unwrap_or("Unknown"));
        match index.get(&name) {
            Some(&i) => merchants[i].amount += t.amount.abs(),
            None => {
                index.insert(name.clone(), merchants.len());
                merchants.push(MerchantSpending {
                    merchant: name,
                    amount: t.amount.abs(),
                });
            }
        }
    }

    merchants.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    merchants.truncate(limit);
    merchants
}

/// Percent change from `previous` to `current`, 0 when there is no baseline
fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

pub(crate) fn classify_trend(current: f64, previous: f64, threshold: f64) -> TrendDirection {
    let change = percent_change(current, previous);
    if change.abs() < threshold {
        TrendDirection::Stable
    } else if change > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    }
}

fn detect_anomaly(category: &str, current: f64, average: f64) -> Option<SpendingAnomaly> {
    let deviation = percent_change(current, average);
    AnomalySeverity::from_deviation(deviation).map(|severity| SpendingAnomaly {
        category: category.to_string(),
        current_amount: current,
        average_amount: average,
        deviation_percent: deviation,
        severity,
    })
}
