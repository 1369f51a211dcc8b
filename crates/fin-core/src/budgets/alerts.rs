//! Budget alert rules

use std::collections::HashMap;

use super::types::{AlertSeverity, AlertThresholds, AlertType, BudgetAlert, BudgetProgress};

/// Alerts for a progress snapshot, critical first
///
/// `historical_average` maps category to its mean spend over previous periods;
/// categories without history never raise unusual-spending alerts.
pub fn evaluate_alerts(
    progress: &BudgetProgress,
    historical_average: &HashMap<String, f64>,
    thresholds: &AlertThresholds,
) -> Vec<BudgetAlert> {
    let mut alerts = Vec::new();

    for category in &progress.categories {
        let alert = |alert_type, severity, message: String| BudgetAlert {
            budget_id: progress.budget_id.clone(),
            category: category.category_name.clone(),
            alert_type,
            severity,
            message,
            spent_amount: category.spent_amount,
            budgeted_amount: category.available(),
            percent_used: category.percent_used,
        };

        let approaching = thresholds.approaching_for(&category.category_name);

        if category.spent_amount > category.available() {
            alerts.push(alert(
                AlertType::Overspending,
                AlertSeverity::Critical,
                format!(
                    "{} is over budget: spent ${:.2} of ${:.2}",
                    category.category_name,
                    category.spent_amount,
                    category.available()
                ),
            ));
        } else if category.percent_used >= approaching {
            alerts.push(alert(
                AlertType::ApproachingLimit,
                AlertSeverity::Warning,
                format!(
                    "{} has used {:.0}% of its budget",
                    category.category_name, category.percent_used
                ),
            ));
        }

        if let Some(average) = historical_average
            .get(&category.category_name)
            .copied()
            .filter(|avg| *avg > 0.0)
        {
            if category.spent_amount > average * thresholds.unusual_multiplier {
                alerts.push(alert(
                    AlertType::UnusualSpending,
                    AlertSeverity::Info,
                    format!(
                        "{} spending of ${:.2} is {:.1}x the usual ${:.2}",
                        category.category_name,
                        category.spent_amount,
                        category.spent_amount / average,
                        average
                    ),
                ));
            }
        }
    }

    alerts.sort_by_key(|a| a.severity);
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budgets::types::{BudgetCategoryProgress, PeriodWindow};
    use chrono::Utc;

    fn category(name: &str, budgeted: f64, spent: f64) -> BudgetCategoryProgress {
        BudgetCategoryProgress {
            category_name: name.to_string(),
            budgeted_amount: budgeted,
            spent_amount: spent,
            remaining_amount: budgeted - spent,
            percent_used: spent / budgeted * 100.0,
            rollover_amount: 0.0,
        }
    }

    fn progress(categories: Vec<BudgetCategoryProgress>) -> BudgetProgress {
        let now = Utc::now();
        BudgetProgress {
            budget_id: "bud_test".to_string(),
            current_period: PeriodWindow {
                start: now,
                end: now,
            },
            categories,
            total_budgeted: 0.0,
            total_spent: 0.0,
            total_remaining: 0.0,
            percent_used: 0.0,
            period_days_elapsed: 0,
            period_days_total: 30,
        }
    }

    #[test]
    fn test_alert_classes() {
        let progress = progress(vec![
            category("Dining", 100.0, 50.0),
            category("Groceries", 500.0, 400.0),
            category("Shopping", 200.0, 250.0),
            category("Fuel", 100.0, 79.0),
        ]);
        let history = HashMap::from([
            ("Dining".to_string(), 30.0),
            ("Fuel".to_string(), 60.0),
        ]);

        let alerts = evaluate_alerts(&progress, &history, &AlertThresholds::default());
        let summary: Vec<(&str, AlertType)> = alerts
            .iter()
            .map(|a| (a.category.as_str(), a.alert_type))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("Shopping", AlertType::Overspending),
                ("Groceries", AlertType::ApproachingLimit),
                ("Dining", AlertType::UnusualSpending),
            ]
        );
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[1].severity, AlertSeverity::Warning);
        assert_eq!(alerts[2].severity, AlertSeverity::Info);
    }

    #[test]
    fn test_category_threshold_override() {
        let progress = progress(vec![category("Dining", 100.0, 65.0)]);
        let mut thresholds = AlertThresholds::default();
        assert!(evaluate_alerts(&progress, &HashMap::new(), &thresholds).is_empty());

        thresholds.per_category.insert("Dining".to_string(), 60.0);
        let alerts = evaluate_alerts(&progress, &HashMap::new(), &thresholds);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::ApproachingLimit);
    }

    #[test]
    fn test_exactly_at_budget_is_not_overspending() {
        let progress = progress(vec![category("Rent", 1000.0, 1000.0)]);
        let alerts = evaluate_alerts(&progress, &HashMap::new(), &AlertThresholds::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::ApproachingLimit);
    }
}
