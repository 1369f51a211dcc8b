//! Financial goals
//!
//! Goal validation, progress projection, and the planning calculators
//! (retirement, home purchase, debt payoff, wealth milestones).

mod calculators;
mod types;

pub use calculators::{
    calculate_debt_free_goal, calculate_home_purchase_goal, calculate_retirement_goal,
    calculate_wealth_milestone, CalculatorRequest, CalculatorResult, DebtFreePlan,
    HomePurchasePlan, RetirementPlan, WealthMilestonePlan,
};
pub use types::*;

use chrono::{Months, NaiveDate};

/// Mean Gregorian month length
const DAYS_PER_MONTH: f64 = 30.4375;

/// Check a goal for errors (which make it invalid) and warnings
pub fn validate_goal(goal: &Goal, today: NaiveDate) -> GoalValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if goal.target_amount <= 0.0 {
        errors.push("Target amount must be positive".to_string());
    }
    if goal.current_amount < 0.0 {
        errors.push("Current amount must not be negative".to_string());
    }

    let allocated: f64 = goal
        .funding_sources
        .iter()
        .map(|s| s.allocation_percent)
        .sum();
    if allocated > 100.0 + f64::EPSILON {
        errors.push(format!(
            "Funding allocations sum to {:.1}%, above 100%",
            allocated
        ));
    }

    for milestone in &goal.milestones {
        if milestone.amount <= 0.0 || milestone.amount > goal.target_amount {
            errors.push(format!(
                "Milestone amount {:.2} must be between 0 and the target {:.2}",
                milestone.amount, goal.target_amount
            ));
        }
    }

    if let Some(deadline) = goal.deadline {
        if deadline < today && goal.status != GoalStatus::Completed {
            warnings.push(format!("Deadline {} has passed", deadline));
        }
    }

    if goal
        .milestones
        .windows(2)
        .any(|pair| pair[1].amount < pair[0].amount)
    {
        warnings.push("Milestones are not in ascending order".to_string());
    }

    GoalValidation {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Progress toward a goal given a steady monthly contribution
pub fn goal_progress(goal: &Goal, monthly_contribution: f64, today: NaiveDate) -> GoalProgress {
    let remaining = goal.remaining();
    let percent_complete = if goal.target_amount > 0.0 {
        (goal.current_amount / goal.target_amount * 100.0).min(100.0)
    } else {
        0.0
    };

    let monthly_required = goal.deadline.map(|deadline| {
        let months_left = (deadline - today).num_days() as f64 / DAYS_PER_MONTH;
        let required = if months_left > 0.0 {
            remaining / months_left
        } else {
            // Past due: everything is needed now
            remaining
        };
        (required * 100.0).round() / 100.0
    });

    let on_track = match monthly_required {
        None => true,
        Some(required) => remaining == 0.0 || monthly_contribution >= required,
    };

    let projected_completion = if remaining == 0.0 {
        Some(today)
    } else if monthly_contribution > 0.0 {
        let months = (remaining / monthly_contribution).ceil();
        u32::try_from(months as i64)
            .ok()
            .and_then(|m| today.checked_add_months(Months::new(m)))
    } else {
        None
    };

    GoalProgress {
        goal_id: goal.id.clone(),
        current_amount: goal.current_amount,
        target_amount: goal.target_amount,
        percent_complete,
        remaining,
        monthly_required,
        on_track,
        projected_completion,
    }
}
