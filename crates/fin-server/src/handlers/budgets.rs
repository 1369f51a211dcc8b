//! Budget handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, Request, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{query_params, read_json};
use crate::{get_user_email, AppError, AppState};
use fin_core::budgets::{
    builtin_templates, parse_datetime_flexible, AlertThresholds, Budget, BudgetAlert,
    BudgetProgress, BudgetTemplate, BudgetType, BudgetUpdate, NewBudget,
};

/// Query parameters for listing budgets
#[derive(Debug, Deserialize)]
pub struct ListBudgetsQuery {
    pub user_id: String,
    #[serde(rename = "type")]
    pub budget_type: Option<String>,
}

/// Request body for creating a budget from a template
#[derive(Debug, Deserialize)]
pub struct FromTemplateRequest {
    pub user_id: String,
    #[serde(alias = "template")]
    pub template_name: String,
    pub total_income: f64,
    pub budget_name: Option<String>,
    pub start_date: Option<String>,
}

/// POST /api/budgets - Create a budget
pub async fn create_budget(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Budget>, AppError> {
    let user_email = get_user_email(request.headers());
    let new: NewBudget = read_json(request).await?;

    let budget = state
        .budgets
        .create_budget(new)
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        "create",
        Some("budget"),
        Some(&budget.id),
        Some(&format!(
            "user_id={}, categories={}",
            budget.user_id,
            budget.categories.len()
        )),
    )?;

    Ok(Json(budget))
}

/// GET /api/budgets - List a user's budgets
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListBudgetsQuery>, QueryRejection>,
    request: Request,
) -> Result<Json<Vec<Budget>>, AppError> {
    let params = query_params(query)?;
    let user_email = get_user_email(request.headers());

    let budget_type: Option<BudgetType> = params
        .budget_type
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|e: String| AppError::bad_request(&e))?;

    let budgets = state
        .budgets
        .list_budgets(&params.user_id, budget_type)
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        "list",
        Some("budget"),
        None,
        Some(&format!(
            "user_id={}, count={}",
            params.user_id,
            budgets.len()
        )),
    )?;

    Ok(Json(budgets))
}

/// GET /api/budgets/templates/list - Built-in templates by name
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<BTreeMap<String, BudgetTemplate>>, AppError> {
    let user_email = get_user_email(request.headers());
    let templates = builtin_templates();

    state
        .db
        .log_audit(&user_email, "list", Some("budget_template"), None, None)?;

    Ok(Json(templates))
}

/// POST /api/budgets/from-template - Create a budget from a template
pub async fn create_budget_from_template(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Budget>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: FromTemplateRequest = read_json(request).await?;

    let start_date = match req.start_date.as_deref() {
        Some(raw) => Some(
            parse_datetime_flexible(raw)
                .ok_or_else(|| AppError::bad_request(&format!("Invalid start_date: {}", raw)))?,
        ),
        None => None,
    };

    let budget = state
        .budgets
        .create_from_template(
            &req.user_id,
            &req.template_name,
            req.total_income,
            req.budget_name,
            start_date,
        )
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        "create",
        Some("budget"),
        Some(&budget.id),
        Some(&format!("template={}", req.template_name)),
    )?;

    Ok(Json(budget))
}

/// GET /api/budgets/:id - Get a single budget
pub async fn get_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<Budget>, AppError> {
    let user_email = get_user_email(request.headers());

    let budget = state
        .budgets
        .get_budget(&id)
        .map_err(AppError::from_core)?
        .ok_or_else(|| AppError::not_found(&format!("Budget not found: {}", id)))?;

    state
        .db
        .log_audit(&user_email, "get", Some("budget"), Some(&id), None)?;

    Ok(Json(budget))
}

/// PATCH /api/budgets/:id - Update a budget
pub async fn update_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<Budget>, AppError> {
    let user_email = get_user_email(request.headers());
    let update: BudgetUpdate = read_json(request).await?;

    let budget = state
        .budgets
        .update_budget(&id, update)
        .map_err(AppError::from_core)?;

    state
        .db
        .log_audit(&user_email, "update", Some("budget"), Some(&id), None)?;

    Ok(Json(budget))
}

/// DELETE /api/budgets/:id - Delete a budget
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<StatusCode, AppError> {
    let user_email = get_user_email(request.headers());

    state
        .budgets
        .delete_budget(&id)
        .map_err(AppError::from_core)?;

    state
        .db
        .log_audit(&user_email, "delete", Some("budget"), Some(&id), None)?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/budgets/:id/progress - Progress for the current period
pub async fn get_budget_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<BudgetProgress>, AppError> {
    let user_email = get_user_email(request.headers());

    let progress = state
        .budgets
        .get_budget_progress(&id)
        .await
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        "progress",
        Some("budget"),
        Some(&id),
        Some(&format!("percent_used={:.1}", progress.percent_used)),
    )?;

    Ok(Json(progress))
}

/// GET /api/budgets/:id/alerts - Alerts with default thresholds
pub async fn get_budget_alerts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<Vec<BudgetAlert>>, AppError> {
    let user_email = get_user_email(request.headers());

    let alerts = state
        .budgets
        .check_budget_alerts(&id, &AlertThresholds::default())
        .await
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        "alerts",
        Some("budget"),
        Some(&id),
        Some(&format!("count={}", alerts.len())),
    )?;

    Ok(Json(alerts))
}
