//! Integration tests for fin-core
//!
//! These tests exercise the public workflows end to end: CSV export →
//! spending analysis, and template → budget → progress → alerts on an
//! encrypted database.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use fin_core::{
    analytics::{AnalyzerConfig, Baseline, SpendingAnalyzer, TrendDirection},
    budgets::{AlertThresholds, AlertType, BudgetPeriod, BudgetTracker, BudgetType, NewBudget},
    credit::{easy_credit, CreditConfig, Environment},
    db::Database,
    goals::{goal_progress, validate_goal, CalculatorRequest, Goal, GoalType},
    providers::{parse_transactions_csv, MockTransactionFeed, StaticTransactionFeed},
    Error,
};

/// Two months of card activity exported as CSV
fn card_export_csv() -> &'static str {
    "date,description,amount,category
2025-01-03,SAFEWAY GROCERIES,-82.10,
2025-01-09,SHELL OIL 5521,-41.00,
2025-01-12,SQ *BLUE BOTTLE,-6.50,Restaurants
2025-01-20,PAYROLL DEPOSIT,2500.00,
2025-01-24,AMAZON.COM,-64.99,
2025-02-02,SAFEWAY GROCERIES,-140.25,
2025-02-08,TST* LOCAL CAFE,-38.40,
2025-02-14,AMAZON.COM,-120.00,
2025-02-20,PAYROLL DEPOSIT,2500.00,
2025-02-25,AMAZON.COM,-35.01,"
}

fn scratch_db(dir: &tempfile::TempDir, passphrase: Option<&str>) -> Database {
    let path = dir.path().join("fin.db");
    Database::new_with_key(&path.to_string_lossy(), passphrase).expect("Failed to open database")
}

// =============================================================================
// Spending Analytics
// =============================================================================

#[tokio::test]
async fn test_csv_export_analysis() {
    let transactions =
        parse_transactions_csv(card_export_csv().as_bytes(), "card").expect("Failed to parse CSV");
    assert_eq!(transactions.len(), 10);

    let feed = Arc::new(StaticTransactionFeed::new(transactions));
    let end = feed.latest_date().unwrap();
    assert_eq!(end, NaiveDate::from_ymd_opt(2025, 2, 25).unwrap());

    let analyzer = SpendingAnalyzer::new(feed).with_config(AnalyzerConfig {
        baseline: Baseline::History {
            lookback_periods: 1,
        },
        ..Default::default()
    });
    let insight = analyzer
        .analyze_as_of("user_1", "30d", None, end)
        .await
        .unwrap();

    // 2025-01-26 ..= 2025-02-25, income excluded
    assert!((insight.total_spending - 333.66).abs() < 1e-6);
    assert_eq!(insight.top_merchants[0].merchant, "AMAZON.COM");
    assert!((insight.top_merchants[0].amount - 155.01).abs() < 1e-6);

    // January shopping was 64.99, February 155.01
    assert_eq!(
        insight.spending_trends.get("Shopping"),
        Some(&TrendDirection::Increasing)
    );
    // Fuel only appears in the previous window
    assert!(!insight.category_breakdown.contains_key("Transportation"));
}

#[tokio::test]
async fn test_mock_feed_analysis_is_stable() {
    let anchor = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
    let analyzer = SpendingAnalyzer::new(Arc::new(MockTransactionFeed::anchored_at(anchor)));

    let insight = analyzer
        .analyze_as_of("anyone", "30d", None, anchor)
        .await
        .unwrap();
    assert!((insight.total_spending - 914.48).abs() < 1e-6);
    assert_eq!(insight.category_breakdown.len(), 6);

    let err = analyzer
        .analyze_as_of("anyone", "30", None, anchor)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

// =============================================================================
// Budgets
// =============================================================================

#[tokio::test]
async fn test_template_budget_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let db = scratch_db(&dir, Some("integration passphrase"));

    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let transactions = parse_transactions_csv(card_export_csv().as_bytes(), "card").unwrap();
    let tracker = BudgetTracker::new(db.clone(), Arc::new(StaticTransactionFeed::new(transactions)));

    let budget = tracker
        .create_from_template("user_1", "zero-based", 4321.0, Some("Winter".into()), Some(start))
        .unwrap();
    assert_eq!(budget.name, "Winter");
    assert_eq!(budget.categories.len(), 8);
    assert!((budget.total_budgeted() - 4321.0).abs() < 1e-6);

    // Second 30-day window: 2025-01-31 .. 2025-03-02
    let progress = tracker
        .get_budget_progress_at(&budget.id, start + Duration::days(45))
        .await
        .unwrap();
    assert_eq!(progress.current_period.start, start + Duration::days(30));
    assert_eq!(progress.period_days_elapsed, 15);

    let groceries = progress
        .categories
        .iter()
        .find(|c| c.category_name == "Groceries")
        .unwrap();
    assert!((groceries.spent_amount - 140.25).abs() < 1e-6);

    // Reopening with the same passphrase sees the same budget
    drop(tracker);
    drop(db);
    let reopened = scratch_db(&dir, Some("integration passphrase"));
    let stored = reopened.get_budget(&budget.id).unwrap().unwrap();
    assert_eq!(stored.categories, budget.categories);
}

#[tokio::test]
async fn test_overspending_alert_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let db = scratch_db(&dir, None);
    let transactions = parse_transactions_csv(card_export_csv().as_bytes(), "card").unwrap();
    let tracker = BudgetTracker::new(db, Arc::new(StaticTransactionFeed::new(transactions)));

    let start = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
    let budget = tracker
        .create_budget(NewBudget {
            user_id: "user_1".to_string(),
            name: "February".to_string(),
            budget_type: BudgetType::Personal,
            period: BudgetPeriod::Monthly,
            categories: BTreeMap::from([
                ("Groceries".to_string(), 150.0),
                ("Shopping".to_string(), 100.0),
            ]),
            start_date: Some(start),
            rollover_enabled: false,
        })
        .unwrap();

    let alerts = tracker
        .check_budget_alerts_at(
            &budget.id,
            &AlertThresholds::default(),
            start + Duration::days(27),
        )
        .await
        .unwrap();

    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].category, "Shopping");
    assert_eq!(alerts[0].alert_type, AlertType::Overspending);
    assert_eq!(alerts[1].category, "Groceries");
    assert_eq!(alerts[1].alert_type, AlertType::ApproachingLimit);

    assert_eq!(tracker.list_budgets("user_1", None).unwrap().len(), 1);
    tracker.delete_budget(&budget.id).unwrap();
    assert!(tracker.list_budgets("user_1", None).unwrap().is_empty());
}

// =============================================================================
// Credit
// =============================================================================

#[tokio::test]
async fn test_easy_credit_sample_data() {
    let provider = easy_credit(
        "Experian",
        CreditConfig {
            api_key: Some("key".to_string()),
            environment: Some(Environment::Sandbox),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(provider.bureau(), "experian");

    let score = provider.get_credit_score("user_9").await.unwrap();
    assert!((300..=850).contains(&score.score));

    let report = provider.get_credit_report("user_9").await.unwrap();
    assert_eq!(report.user_id, "user_9");
    assert!(!report.accounts.is_empty());

    assert!(matches!(
        easy_credit("equifax", CreditConfig::default()),
        Err(Error::NotImplemented(_))
    ));
}

// =============================================================================
// Goals
// =============================================================================

#[test]
fn test_goal_planning() {
    let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let mut goal = Goal::new("user_1", "House down payment", GoalType::Savings, 80_000.0);
    goal.current_amount = 20_000.0;
    goal.deadline = today.checked_add_months(chrono::Months::new(60));

    let validation = validate_goal(&goal, today);
    assert!(validation.valid);

    let plan: CalculatorRequest = serde_json::from_value(serde_json::json!({
        "kind": "home_purchase",
        "home_price": 400000,
        "down_payment_percent": 20,
        "current_savings": 20000,
        "months": 60
    }))
    .unwrap();
    let result = serde_json::to_value(plan.evaluate().unwrap()).unwrap();
    assert_eq!(result["monthly_savings_needed"], 1000.0);

    let progress = goal_progress(&goal, 1_100.0, today);
    assert_eq!(progress.percent_complete, 25.0);
    assert!(progress.on_track);
}
