//! Goal planning calculators
//!
//! All rates are annual decimal fractions (`0.07` for 7%) compounded monthly.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Simulation horizon for open-ended projections
const MAX_MONTHS: u32 = 100 * 12;

fn monthly_rate(annual: f64) -> f64 {
    annual / 12.0
}

/// Future value of `monthly` paid at the end of each of `months` periods
fn annuity_factor(rate: f64, months: u32) -> f64 {
    if rate == 0.0 {
        months as f64
    } else {
        ((1.0 + rate).powi(months as i32) - 1.0) / rate
    }
}

fn growth(rate: f64, months: u32) -> f64 {
    (1.0 + rate).powi(months as i32)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementPlan {
    pub months_to_retirement: u32,
    pub projected_balance: f64,
    pub target_amount: f64,
    pub shortfall: f64,
    pub required_monthly_contribution: f64,
    pub on_track: bool,
}

pub fn calculate_retirement_goal(
    current_age: u32,
    retirement_age: u32,
    current_savings: f64,
    monthly_contribution: f64,
    annual_return: f64,
    target_amount: f64,
) -> Result<RetirementPlan> {
    if retirement_age <= current_age {
        return Err(Error::InvalidData(
            "Retirement age must be greater than current age".to_string(),
        ));
    }

    let months = (retirement_age - current_age)
        .checked_mul(12)
        .filter(|m| *m <= MAX_MONTHS)
        .ok_or_else(|| {
            Error::InvalidData("Retirement must be within 100 years".to_string())
        })?;
    let rate = monthly_rate(annual_return);
    let grown_savings = current_savings * growth(rate, months);
    let factor = annuity_factor(rate, months);

    let projected = grown_savings + monthly_contribution * factor;
    let shortfall = (target_amount - projected).max(0.0);
    let required = ((target_amount - grown_savings) / factor).max(0.0);

    Ok(RetirementPlan {
        months_to_retirement: months,
        projected_balance: round_cents(projected),
        target_amount,
        shortfall: round_cents(shortfall),
        required_monthly_contribution: round_cents(required),
        on_track: shortfall == 0.0,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomePurchasePlan {
    pub home_price: f64,
    pub down_payment_target: f64,
    pub current_savings: f64,
    pub months: u32,
    pub monthly_savings_needed: f64,
}

pub fn calculate_home_purchase_goal(
    home_price: f64,
    down_payment_percent: f64,
    current_savings: f64,
    months: u32,
    annual_return: f64,
) -> Result<HomePurchasePlan> {
    if home_price <= 0.0 {
        return Err(Error::InvalidData("Home price must be positive".to_string()));
    }
    if !(0.0..=100.0).contains(&down_payment_percent) {
        return Err(Error::InvalidData(
            "Down payment percent must be between 0 and 100".to_string(),
        ));
    }
    if months == 0 {
        return Err(Error::InvalidData("Months must be positive".to_string()));
    }
    if months > MAX_MONTHS {
        return Err(Error::InvalidData(format!(
            "Months must be at most {}",
            MAX_MONTHS
        )));
    }

    let rate = monthly_rate(annual_return);
    let target = home_price * down_payment_percent / 100.0;
    let still_needed = target - current_savings * growth(rate, months);
    let monthly = (still_needed / annuity_factor(rate, months)).max(0.0);

    Ok(HomePurchasePlan {
        home_price,
        down_payment_target: round_cents(target),
        current_savings,
        months,
        monthly_savings_needed: round_cents(monthly),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtFreePlan {
    pub months_to_payoff: u32,
    pub total_interest: f64,
    pub total_paid: f64,
}

/// Amortize `balance` at `apr` with a fixed payment
pub fn calculate_debt_free_goal(balance: f64, apr: f64, monthly_payment: f64) -> Result<DebtFreePlan> {
    if balance < 0.0 {
        return Err(Error::InvalidData("Balance must not be negative".to_string()));
    }

    let rate = monthly_rate(apr);
    if balance > 0.0 && monthly_payment <= balance * rate {
        return Err(Error::InvalidData(
            "Monthly payment does not cover the interest".to_string(),
        ));
    }
    if balance > 0.0 && monthly_payment <= 0.0 {
        return Err(Error::InvalidData("Monthly payment must be positive".to_string()));
    }

    let mut remaining = balance;
    let mut months = 0;
    let mut total_interest = 0.0;
    let mut total_paid = 0.0;

    while remaining > 0.005 && months < MAX_MONTHS {
        let interest = remaining * rate;
        remaining += interest;
        let payment = monthly_payment.min(remaining);
        remaining -= payment;

        total_interest += interest;
        total_paid += payment;
        months += 1;
    }

    if remaining > 0.005 {
        return Err(Error::InvalidData(
            "Debt is not paid off within 100 years".to_string(),
        ));
    }

    Ok(DebtFreePlan {
        months_to_payoff: months,
        total_interest: round_cents(total_interest),
        total_paid: round_cents(total_paid),
    })
}

/// Months until net worth reaches `target`, or `None` past 100 years
pub fn calculate_wealth_milestone(
    current_net_worth: f64,
    target: f64,
    monthly_contribution: f64,
    annual_return: f64,
) -> Option<u32> {
    let rate = monthly_rate(annual_return);
    let mut balance = current_net_worth;

    for month in 0..=MAX_MONTHS {
        if balance >= target {
            return Some(month);
        }
        balance = balance * (1.0 + rate) + monthly_contribution;
    }
    None
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WealthMilestonePlan {
    pub current_net_worth: f64,
    pub target: f64,
    pub months_to_target: Option<u32>,
    pub reachable: bool,
}

/// Calculator input, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculatorRequest {
    Retirement {
        current_age: u32,
        retirement_age: u32,
        current_savings: f64,
        monthly_contribution: f64,
        annual_return: f64,
        target_amount: f64,
    },
    HomePurchase {
        home_price: f64,
        down_payment_percent: f64,
        current_savings: f64,
        months: u32,
        #[serde(default)]
        annual_return: f64,
    },
    DebtFree {
        balance: f64,
        apr: f64,
        monthly_payment: f64,
    },
    WealthMilestone {
        current_net_worth: f64,
        target: f64,
        monthly_contribution: f64,
        annual_return: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculatorResult {
    Retirement(RetirementPlan),
    HomePurchase(HomePurchasePlan),
    DebtFree(DebtFreePlan),
    WealthMilestone(WealthMilestonePlan),
}

impl CalculatorRequest {
    pub fn evaluate(&self) -> Result<CalculatorResult> {
        Ok(match *self {
            Self::Retirement {
                current_age,
                retirement_age,
                current_savings,
                monthly_contribution,
                annual_return,
                target_amount,
            } => CalculatorResult::Retirement(calculate_retirement_goal(
                current_age,
                retirement_age,
                current_savings,
                monthly_contribution,
                annual_return,
                target_amount,
            )?),
            Self::HomePurchase {
                home_price,
                down_payment_percent,
                current_savings,
                months,
                annual_return,
            } => CalculatorResult::HomePurchase(calculate_home_purchase_goal(
                home_price,
                down_payment_percent,
                current_savings,
                months,
                annual_return,
            )?),
            Self::DebtFree {
                balance,
                apr,
                monthly_payment,
            } => CalculatorResult::DebtFree(calculate_debt_free_goal(balance, apr, monthly_payment)?),
            Self::WealthMilestone {
                current_net_worth,
                target,
                monthly_contribution,
                annual_return,
            } => {
                let months = calculate_wealth_milestone(
                    current_net_worth,
                    target,
                    monthly_contribution,
                    annual_return,
                );
                CalculatorResult::WealthMilestone(WealthMilestonePlan {
                    current_net_worth,
                    target,
                    months_to_target: months,
                    reachable: months.is_some(),
                })
            }
        })
    }
}
