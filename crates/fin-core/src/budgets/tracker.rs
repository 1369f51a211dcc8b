//! Budget CRUD and progress tracking
//!
//! Budgets repeat every period from their start date. Progress is always
//! computed for the period window containing "now", with spending pulled from
//! the transaction feed and bucketed by the categorizer.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::alerts::evaluate_alerts;
use super::templates::{apply_template, get_template};
use super::types::{
    AlertThresholds, Budget, BudgetAlert, BudgetCategoryProgress, BudgetProgress, BudgetType,
    BudgetUpdate, NewBudget, PeriodWindow,
};
use crate::analytics::{Categorizer, KeywordCategorizer};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::providers::TransactionFeed;

/// Previous periods averaged for unusual-spending alerts
const ALERT_HISTORY_PERIODS: i64 = 3;

fn new_budget_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("bud_{}", &hex[..12])
}

fn validate_categories(categories: &std::collections::BTreeMap<String, f64>) -> Result<()> {
    for (name, amount) in categories {
        if name.trim().is_empty() {
            return Err(Error::InvalidData(
                "Category names must not be empty".to_string(),
            ));
        }
        if !amount.is_finite() || *amount < 0.0 {
            return Err(Error::InvalidData(format!(
                "Budgeted amount for {} must be a non-negative number",
                name
            )));
        }
    }
    Ok(())
}

/// Budget tracker over the database and a transaction feed
#[derive(Clone)]
pub struct BudgetTracker {
    db: Database,
    feed: Arc<dyn TransactionFeed>,
    categorizer: Arc<dyn Categorizer>,
}

impl BudgetTracker {
    pub fn new(db: Database, feed: Arc<dyn TransactionFeed>) -> Self {
        Self {
            db,
            feed,
            categorizer: Arc::new(KeywordCategorizer::new()),
        }
    }

    pub fn with_categorizer(mut self, categorizer: Arc<dyn Categorizer>) -> Self {
        self.categorizer = categorizer;
        self
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn create_budget(&self, new: NewBudget) -> Result<Budget> {
        if new.name.trim().is_empty() {
            return Err(Error::InvalidData("Budget name must not be empty".to_string()));
        }
        validate_categories(&new.categories)?;

        let now = Utc::now();
        let start_date = new.start_date.unwrap_or(now);
        let budget = Budget {
            id: new_budget_id(),
            user_id: new.user_id,
            name: new.name,
            budget_type: new.budget_type,
            period: new.period,
            categories: new.categories,
            start_date,
            end_date: start_date + Duration::days(new.period.days()),
            rollover_enabled: new.rollover_enabled,
            created_at: now,
            updated_at: now,
        };

        self.db.insert_budget(&budget)?;
        info!(
            budget_id = %budget.id,
            user_id = %budget.user_id,
            categories = budget.categories.len(),
            "Created budget"
        );
        Ok(budget)
    }

    /// A user's budgets, newest first
    pub fn list_budgets(
        &self,
        user_id: &str,
        budget_type: Option<BudgetType>,
    ) -> Result<Vec<Budget>> {
        self.db.list_budgets(user_id, budget_type)
    }

    pub fn get_budget(&self, id: &str) -> Result<Option<Budget>> {
        self.db.get_budget(id)
    }

    fn require_budget(&self, id: &str) -> Result<Budget> {
        self.db
            .get_budget(id)?
            .ok_or_else(|| Error::NotFound(format!("Budget not found: {}", id)))
    }

    pub fn update_budget(&self, id: &str, update: BudgetUpdate) -> Result<Budget> {
        if update.is_empty() {
            return Err(Error::InvalidData("No updates provided".to_string()));
        }

        let mut budget = self.require_budget(id)?;

        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(Error::InvalidData("Budget name must not be empty".to_string()));
            }
            budget.name = name;
        }
        if let Some(categories) = update.categories {
            validate_categories(&categories)?;
            budget.categories = categories;
        }
        if let Some(rollover) = update.rollover_enabled {
            budget.rollover_enabled = rollover;
        }
        if let Some(period) = update.period {
            budget.period = period;
        }
        if let Some(start_date) = update.start_date {
            budget.start_date = start_date;
        }
        budget.end_date = budget.start_date + Duration::days(budget.period.days());
        budget.updated_at = Utc::now();

        if !self.db.update_budget(&budget)? {
            return Err(Error::NotFound(format!("Budget not found: {}", id)));
        }
        info!(budget_id = %id, "Updated budget");
        Ok(budget)
    }

    pub fn delete_budget(&self, id: &str) -> Result<()> {
        if !self.db.delete_budget(id)? {
            return Err(Error::NotFound(format!("Budget not found: {}", id)));
        }
        info!(budget_id = %id, "Deleted budget");
        Ok(())
    }

    /// Create a budget by splitting `total_income` with a built-in template
    pub fn create_from_template(
        &self,
        user_id: &str,
        template_name: &str,
        total_income: f64,
        budget_name: Option<String>,
        start_date: Option<DateTime<Utc>>,
    ) -> Result<Budget> {
        let template = get_template(template_name)
            .ok_or_else(|| Error::InvalidData(format!("Template not found: {}", template_name)))?;

        let categories = apply_template(&template, total_income)?;

        self.create_budget(NewBudget {
            user_id: user_id.to_string(),
            name: budget_name.unwrap_or_else(|| template.name.clone()),
            budget_type: template.budget_type,
            period: template.period,
            categories,
            start_date,
            rollover_enabled: false,
        })
    }

    pub async fn get_budget_progress(&self, id: &str) -> Result<BudgetProgress> {
        self.get_budget_progress_at(id, Utc::now()).await
    }

    /// Progress for the period containing `now`
    pub async fn get_budget_progress_at(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<BudgetProgress> {
        let budget = self.require_budget(id)?;
        self.progress_for(&budget, now).await
    }

    pub async fn check_budget_alerts(
        &self,
        id: &str,
        thresholds: &AlertThresholds,
    ) -> Result<Vec<BudgetAlert>> {
        self.check_budget_alerts_at(id, thresholds, Utc::now()).await
    }

    pub async fn check_budget_alerts_at(
        &self,
        id: &str,
        thresholds: &AlertThresholds,
        now: DateTime<Utc>,
    ) -> Result<Vec<BudgetAlert>> {
        let budget = self.require_budget(id)?;
        let progress = self.progress_for(&budget, now).await?;

        let index = period_index(&budget, now);
        let mut totals: HashMap<String, f64> = HashMap::new();
        let mut periods = 0;
        for back in 1..=ALERT_HISTORY_PERIODS.min(index) {
            let spent = self.period_spending(&budget, index - back).await?;
            for (category, amount) in spent {
                *totals.entry(category).or_insert(0.0) += amount;
            }
            periods += 1;
        }

        let average: HashMap<String, f64> = if periods > 0 {
            totals
                .into_iter()
                .map(|(category, total)| (category, total / periods as f64))
                .collect()
        } else {
            HashMap::new()
        };

        let alerts = evaluate_alerts(&progress, &average, thresholds);
        debug!(budget_id = %id, alerts = alerts.len(), "Checked budget alerts");
        Ok(alerts)
    }

    async fn progress_for(&self, budget: &Budget, now: DateTime<Utc>) -> Result<BudgetProgress> {
        let index = period_index(budget, now);
        let window = period_window(budget, index);
        let period_days_total = budget.period.days();

        let spent = self.period_spending(budget, index).await?;
        let previous = if budget.rollover_enabled && index > 0 {
            Some(self.period_spending(budget, index - 1).await?)
        } else {
            None
        };

        let categories: Vec<BudgetCategoryProgress> = budget
            .categories
            .iter()
            .map(|(name, budgeted)| {
                let spent_amount = spent.get(name).copied().unwrap_or(0.0);
                let rollover_amount = previous
                    .as_ref()
                    .map(|prev| (budgeted - prev.get(name).copied().unwrap_or(0.0)).max(0.0))
                    .unwrap_or(0.0);
                let available = budgeted + rollover_amount;

                BudgetCategoryProgress {
                    category_name: name.clone(),
                    budgeted_amount: *budgeted,
                    spent_amount,
                    remaining_amount: available - spent_amount,
                    percent_used: percent(spent_amount, available),
                    rollover_amount,
                }
            })
            .collect();

        let total_budgeted: f64 = categories.iter().map(|c| c.available()).sum();
        let total_spent: f64 = categories.iter().map(|c| c.spent_amount).sum();

        Ok(BudgetProgress {
            budget_id: budget.id.clone(),
            current_period: window,
            total_budgeted,
            total_spent,
            total_remaining: total_budgeted - total_spent,
            percent_used: percent(total_spent, total_budgeted),
            period_days_elapsed: (now - window.start)
                .num_days()
                .clamp(0, period_days_total),
            period_days_total,
            categories,
        })
    }

    /// Spending per budget category within period `index`
    async fn period_spending(&self, budget: &Budget, index: i64) -> Result<HashMap<String, f64>> {
        let window = period_window(budget, index);
        // Window end is exclusive
        let last_day = (window.end - Duration::days(1)).date_naive();

        let transactions = self
            .feed
            .transactions(&budget.user_id, window.start.date_naive(), last_day)
            .await?;

        let mut spent: HashMap<String, f64> = HashMap::new();
        for tx in transactions.iter().filter(|t| t.is_expense()) {
            let category = self.categorizer.categorize(tx);
            if budget.categories.contains_key(&category) {
                *spent.entry(category).or_insert(0.0) += tx.amount.abs();
            }
        }
        Ok(spent)
    }
}

/// Zero-based index of the period containing `now` (0 before the start)
fn period_index(budget: &Budget, now: DateTime<Utc>) -> i64 {
    let days_since_start = (now - budget.start_date).num_days();
    days_since_start.div_euclid(budget.period.days()).max(0)
}

fn period_window(budget: &Budget, index: i64) -> PeriodWindow {
    let len = budget.period.days();
    let start = budget.start_date + Duration::days(len * index);
    PeriodWindow {
        start,
        end: start + Duration::days(len),
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budgets::{AlertType, BudgetPeriod};
    use crate::models::Transaction;
    use crate::providers::StaticTransactionFeed;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn tx(id: &str, description: &str, amount: f64, days_after_start: i64) -> Transaction {
        Transaction {
            id: id.to_string(),
            account_id: "acct".to_string(),
            amount,
            date: (start() + Duration::days(days_after_start)).date_naive(),
            description: Some(description.to_string()),
            category: None,
        }
    }

    fn tracker(transactions: Vec<Transaction>) -> BudgetTracker {
        BudgetTracker::new(
            Database::in_memory().unwrap(),
            Arc::new(StaticTransactionFeed::new(transactions)),
        )
    }

    fn new_budget(rollover: bool) -> NewBudget {
        NewBudget {
            user_id: "user_1".to_string(),
            name: "Household".to_string(),
            budget_type: BudgetType::Household,
            period: BudgetPeriod::Monthly,
            categories: BTreeMap::from([
                ("Groceries".to_string(), 600.0),
                ("Restaurants".to_string(), 200.0),
            ]),
            start_date: Some(start()),
            rollover_enabled: rollover,
        }
    }

    #[test]
    fn test_create_sets_id_and_end_date() {
        let tracker = tracker(vec![]);
        let budget = tracker.create_budget(new_budget(false)).unwrap();

        assert!(budget.id.starts_with("bud_"));
        assert_eq!(budget.id.len(), 16);
        assert_eq!(budget.end_date, start() + Duration::days(30));

        let fetched = tracker.get_budget(&budget.id).unwrap().unwrap();
        assert_eq!(fetched, budget);
    }

    #[test]
    fn test_create_rejects_negative_amounts() {
        let tracker = tracker(vec![]);
        let mut new = new_budget(false);
        new.categories.insert("Fun".to_string(), -5.0);
        assert!(matches!(
            tracker.create_budget(new),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_update_recomputes_end_date() {
        let tracker = tracker(vec![]);
        let budget = tracker.create_budget(new_budget(false)).unwrap();

        let updated = tracker
            .update_budget(
                &budget.id,
                BudgetUpdate {
                    period: Some(BudgetPeriod::Weekly),
                    categories: Some(BTreeMap::from([("Food".to_string(), 100.0)])),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.end_date, start() + Duration::days(7));
        assert_eq!(updated.categories.len(), 1);
        assert_eq!(updated.name, "Household");

        let err = tracker
            .update_budget(&budget.id, BudgetUpdate::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "No updates provided");

        let err = tracker
            .update_budget(
                "bud_missing",
                BudgetUpdate {
                    name: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_delete() {
        let tracker = tracker(vec![]);
        let budget = tracker.create_budget(new_budget(false)).unwrap();

        tracker.delete_budget(&budget.id).unwrap();
        assert!(tracker.get_budget(&budget.id).unwrap().is_none());
        assert!(matches!(
            tracker.delete_budget(&budget.id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_from_template() {
        let tracker = tracker(vec![]);
        let budget = tracker
            .create_from_template("user_5", "50/30/20", 5000.0, None, None)
            .unwrap();
        assert_eq!(budget.name, "50/30/20");
        assert_eq!(budget.budget_type, BudgetType::Personal);
        assert!((budget.total_budgeted() - 5000.0).abs() < 1e-9);

        let err = tracker
            .create_from_template("user_5", "nonexistent-template", 5000.0, None, None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Template not found: nonexistent-template");
    }

    #[test]
    fn test_from_template_rejects_huge_income() {
        let tracker = tracker(vec![]);
        let err = tracker
            .create_from_template("user_5", "zero-based", 1e30, None, None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
        assert!(tracker.list_budgets("user_5", None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_progress_current_period() {
        let tracker = tracker(vec![
            tx("a", "SAFEWAY", -150.0, 31),
            tx("b", "WHOLE FOODS", -90.0, 40),
            tx("c", "STARBUCKS", -20.0, 45),
            tx("d", "NETFLIX", -15.0, 45), // not a budget category
            tx("e", "SAFEWAY REFUND", 30.0, 46), // income
            tx("f", "SAFEWAY", -500.0, 10), // previous period
        ]);
        let budget = tracker.create_budget(new_budget(false)).unwrap();

        let now = start() + Duration::days(50);
        let progress = tracker.get_budget_progress_at(&budget.id, now).await.unwrap();

        assert_eq!(progress.current_period.start, start() + Duration::days(30));
        assert_eq!(progress.current_period.end, start() + Duration::days(60));
        assert_eq!(progress.period_days_elapsed, 20);
        assert_eq!(progress.period_days_total, 30);

        let groceries = &progress.categories[0];
        assert_eq!(groceries.category_name, "Groceries");
        assert_eq!(groceries.spent_amount, 240.0);
        assert_eq!(groceries.remaining_amount, 360.0);
        assert!((groceries.percent_used - 40.0).abs() < 1e-9);
        assert_eq!(groceries.rollover_amount, 0.0);

        assert_eq!(progress.total_budgeted, 800.0);
        assert_eq!(progress.total_spent, 260.0);
        assert_eq!(progress.total_remaining, 540.0);
    }

    #[tokio::test]
    async fn test_progress_before_start() {
        let tracker = tracker(vec![]);
        let budget = tracker.create_budget(new_budget(false)).unwrap();

        let progress = tracker
            .get_budget_progress_at(&budget.id, start() - Duration::days(3))
            .await
            .unwrap();
        assert_eq!(progress.current_period.start, start());
        assert_eq!(progress.period_days_elapsed, 0);
        assert_eq!(progress.percent_used, 0.0);
    }

    #[tokio::test]
    async fn test_rollover_carries_unspent() {
        let tracker = tracker(vec![
            tx("a", "SAFEWAY", -400.0, 5),     // previous: 200 unspent
            tx("b", "RESTAURANT", -250.0, 6),  // previous: overspent, nothing carried
            tx("c", "SAFEWAY", -100.0, 35),
        ]);
        let budget = tracker.create_budget(new_budget(true)).unwrap();

        let progress = tracker
            .get_budget_progress_at(&budget.id, start() + Duration::days(40))
            .await
            .unwrap();

        let groceries = &progress.categories[0];
        assert_eq!(groceries.rollover_amount, 200.0);
        assert_eq!(groceries.remaining_amount, 700.0);
        assert_eq!(groceries.percent_used, 12.5);

        let restaurants = &progress.categories[1];
        assert_eq!(restaurants.rollover_amount, 0.0);
        assert_eq!(progress.total_budgeted, 1000.0);
    }

    #[tokio::test]
    async fn test_alerts_with_history() {
        let tracker = tracker(vec![
            // three previous periods of ~100 on restaurants
            tx("p1", "RESTAURANT", -100.0, 5),
            tx("p2", "RESTAURANT", -100.0, 35),
            tx("p3", "RESTAURANT", -100.0, 65),
            // current period (days 90-119)
            tx("c1", "RESTAURANT", -180.0, 91),
            tx("c2", "SAFEWAY", -650.0, 92),
        ]);
        let budget = tracker.create_budget(new_budget(false)).unwrap();

        let alerts = tracker
            .check_budget_alerts_at(
                &budget.id,
                &AlertThresholds::default(),
                start() + Duration::days(100),
            )
            .await
            .unwrap();

        let kinds: Vec<(&str, AlertType)> = alerts
            .iter()
            .map(|a| (a.category.as_str(), a.alert_type))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("Groceries", AlertType::Overspending),
                ("Restaurants", AlertType::ApproachingLimit),
                ("Restaurants", AlertType::UnusualSpending),
            ]
        );
    }
}
