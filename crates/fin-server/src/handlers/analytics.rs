//! Spending analytics handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, Request, State},
    Json,
};
use serde::Deserialize;

use super::query_params;
use crate::{get_user_email, AppError, AppState};
use fin_core::analytics::SpendingInsight;

#[derive(Debug, Deserialize)]
pub struct SpendingQuery {
    pub user_id: String,
    #[serde(default = "default_period")]
    pub period: String,
    /// Comma-separated category filter
    pub categories: Option<String>,
}

fn default_period() -> String {
    "30d".to_string()
}

/// GET /api/analytics/spending - Spending insights for a period
pub async fn get_spending_insights(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SpendingQuery>, QueryRejection>,
    request: Request,
) -> Result<Json<SpendingInsight>, AppError> {
    let params = query_params(query)?;
    let user_email = get_user_email(request.headers());

    let categories: Option<Vec<String>> = params.categories.as_deref().map(|raw| {
        raw.split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    });

    let insight = state
        .analyzer
        .analyze(&params.user_id, &params.period, categories.as_deref())
        .await
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        "analyze",
        Some("spending"),
        Some(&params.user_id),
        Some(&format!(
            "period={}, total={:.2}",
            params.period, insight.total_spending
        )),
    )?;

    Ok(Json(insight))
}
