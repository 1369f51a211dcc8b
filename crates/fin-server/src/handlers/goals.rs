//! Goal planning handlers
//!
//! Goals are not persisted; callers send the goal with each request.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use super::read_json;
use crate::{get_user_email, AppError, AppState};
use fin_core::goals::{self, CalculatorRequest, CalculatorResult, Goal, GoalProgress, GoalValidation};

#[derive(Debug, Deserialize)]
pub struct GoalProgressRequest {
    pub goal: Goal,
    #[serde(default)]
    pub monthly_contribution: f64,
    /// Defaults to today
    pub as_of: Option<NaiveDate>,
}

/// POST /api/goals/validate - Validate a goal
pub async fn validate_goal(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<GoalValidation>, AppError> {
    let user_email = get_user_email(request.headers());
    let goal: Goal = read_json(request).await?;

    let validation = goals::validate_goal(&goal, Utc::now().date_naive());

    state.db.log_audit(
        &user_email,
        "validate",
        Some("goal"),
        Some(&goal.id),
        Some(&format!("valid={}", validation.valid)),
    )?;

    Ok(Json(validation))
}

/// POST /api/goals/progress - Project progress for a goal
pub async fn goal_progress(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<GoalProgress>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: GoalProgressRequest = read_json(request).await?;

    let today = req.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let progress = goals::goal_progress(&req.goal, req.monthly_contribution, today);

    state.db.log_audit(
        &user_email,
        "progress",
        Some("goal"),
        Some(&req.goal.id),
        Some(&format!("on_track={}", progress.on_track)),
    )?;

    Ok(Json(progress))
}

/// POST /api/goals/calculate - Run a planning calculator
pub async fn calculate_goal(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<CalculatorResult>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: CalculatorRequest = read_json(request).await?;

    let result = req.evaluate().map_err(AppError::from_core)?;

    state
        .db
        .log_audit(&user_email, "calculate", Some("goal"), None, None)?;

    Ok(Json(result))
}
