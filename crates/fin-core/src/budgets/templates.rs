//! Built-in budget templates
//!
//! Each template splits income across categories by percentage. Allocation
//! works in whole cents so the categories always add back up to the income.

use std::collections::BTreeMap;

use super::types::{BudgetPeriod, BudgetTemplate, BudgetType};
use crate::error::{Error, Result};

/// Largest income a template will split (keeps every cent count well inside i64)
pub const MAX_TEMPLATE_INCOME: f64 = 1e15;

/// (key, description, type, categories)
const TEMPLATES: &[(&str, &str, BudgetType, &[(&str, f64)])] = &[
    (
        "50/30/20",
        "50% needs, 30% wants, 20% savings",
        BudgetType::Personal,
        &[("Needs", 50.0), ("Wants", 30.0), ("Savings", 20.0)],
    ),
    (
        "zero-based",
        "Every dollar of income is assigned a job",
        BudgetType::Personal,
        &[
            ("Housing", 30.0),
            ("Transportation", 10.0),
            ("Groceries", 12.0),
            ("Utilities", 8.0),
            ("Insurance", 10.0),
            ("Debt Payments", 10.0),
            ("Savings", 10.0),
            ("Personal", 10.0),
        ],
    ),
    (
        "envelope",
        "Cash-style envelopes with a hard limit per category",
        BudgetType::Personal,
        &[
            ("Groceries", 15.0),
            ("Dining Out", 10.0),
            ("Entertainment", 10.0),
            ("Clothing", 5.0),
            ("Transportation", 10.0),
            ("Household", 10.0),
            ("Emergency", 10.0),
            ("Bills", 30.0),
        ],
    ),
    (
        "pay-yourself-first",
        "Savings and retirement come out before spending",
        BudgetType::Personal,
        &[
            ("Savings", 20.0),
            ("Retirement", 10.0),
            ("Housing", 30.0),
            ("Living Expenses", 30.0),
            ("Discretionary", 10.0),
        ],
    ),
    (
        "business-essentials",
        "Core operating expense categories for a small business",
        BudgetType::Business,
        &[
            ("Payroll", 40.0),
            ("Operations", 20.0),
            ("Marketing", 15.0),
            ("Technology", 10.0),
            ("Professional Services", 10.0),
            ("Miscellaneous", 5.0),
        ],
    ),
];

fn build(
    (key, description, budget_type, categories): &(&str, &str, BudgetType, &[(&str, f64)]),
) -> BudgetTemplate {
    BudgetTemplate {
        name: key.to_string(),
        description: description.to_string(),
        budget_type: *budget_type,
        period: BudgetPeriod::Monthly,
        categories: categories
            .iter()
            .map(|(name, pct)| (name.to_string(), *pct))
            .collect(),
    }
}

/// All built-in templates keyed by name
pub fn builtin_templates() -> BTreeMap<String, BudgetTemplate> {
    TEMPLATES
        .iter()
        .map(|t| (t.0.to_string(), build(t)))
        .collect()
}

pub fn get_template(name: &str) -> Option<BudgetTemplate> {
    TEMPLATES.iter().find(|t| t.0 == name).map(build)
}

/// Split `total_income` by the template's percentages, rounded to cents
///
/// The rounding remainder goes to the largest category. Income must be
/// positive and at most `MAX_TEMPLATE_INCOME`.
pub fn apply_template(
    template: &BudgetTemplate,
    total_income: f64,
) -> Result<BTreeMap<String, f64>> {
    if !total_income.is_finite() || total_income <= 0.0 {
        return Err(Error::InvalidData(
            "Total income must be positive".to_string(),
        ));
    }
    if total_income > MAX_TEMPLATE_INCOME {
        return Err(Error::InvalidData(format!(
            "Total income must not exceed {:.0}",
            MAX_TEMPLATE_INCOME
        )));
    }

    let income_cents = (total_income * 100.0).round() as i64;

    let mut cents: BTreeMap<String, i64> = template
        .categories
        .iter()
        .map(|(name, pct)| {
            let share = (income_cents as f64 * pct / 100.0).round() as i64;
            (name.clone(), share)
        })
        .collect();

    let remainder = income_cents - cents.values().sum::<i64>();
    if remainder != 0 {
        let largest = template
            .categories
            .iter()
            .fold(None::<(&String, f64)>, |best, (name, pct)| match best {
                Some((_, best_pct)) if best_pct >= *pct => best,
                _ => Some((name, *pct)),
            })
            .map(|(name, _)| name.clone());
        if let Some(share) = largest.and_then(|name| cents.get_mut(&name)) {
            *share += remainder;
        }
    }

    Ok(cents
        .into_iter()
        .map(|(name, c)| (name, c as f64 / 100.0))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_sum_to_100() {
        let templates = builtin_templates();
        assert_eq!(templates.len(), 5);
        for (name, template) in &templates {
            let total: f64 = template.categories.values().sum();
            assert!((total - 100.0).abs() < 1e-9, "{} sums to {}", name, total);
            assert_eq!(template.period, BudgetPeriod::Monthly);
        }
        assert_eq!(
            templates["business-essentials"].budget_type,
            BudgetType::Business
        );
    }

    #[test]
    fn test_apply_50_30_20() {
        let template = get_template("50/30/20").unwrap();
        let allocation = apply_template(&template, 5000.0).unwrap();
        assert_eq!(allocation["Needs"], 2500.0);
        assert_eq!(allocation["Wants"], 1500.0);
        assert_eq!(allocation["Savings"], 1000.0);
    }

    #[test]
    fn test_rounding_remainder_to_largest() {
        // Rounded shares come to 33.34, so Needs gives back a cent
        let template = get_template("50/30/20").unwrap();
        let allocation = apply_template(&template, 33.33).unwrap();
        let total_cents: i64 = allocation
            .values()
            .map(|v| (v * 100.0).round() as i64)
            .sum();
        assert_eq!(total_cents, 3333);

        let template = get_template("zero-based").unwrap();
        let allocation = apply_template(&template, 1234.57).unwrap();
        let total_cents: i64 = allocation
            .values()
            .map(|v| (v * 100.0).round() as i64)
            .sum();
        assert_eq!(total_cents, 123457);
    }

    #[test]
    fn test_income_bounds() {
        let template = get_template("zero-based").unwrap();

        let allocation = apply_template(&template, MAX_TEMPLATE_INCOME).unwrap();
        let total: f64 = allocation.values().sum();
        assert!((total - MAX_TEMPLATE_INCOME).abs() < 1.0);

        for income in [1e30, f64::INFINITY, f64::NAN, 0.0, -10.0] {
            let err = apply_template(&template, income).unwrap_err();
            assert!(matches!(err, Error::InvalidData(_)), "income {}", income);
        }
    }

    #[test]
    fn test_unknown_template() {
        assert!(get_template("nonexistent-template").is_none());
    }
}
