//! Credit bureau handlers
//!
//! Score and report pulls are cached per user and every access is audited.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, Request, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::query_params;
use crate::{get_user_email, AppError, AppState};
use fin_core::credit::{CreditReport, CreditScore, REPORT_ACCESSED_EVENT, SCORE_ACCESSED_EVENT};

#[derive(Debug, Deserialize)]
pub struct CreditQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub user_id: String,
    pub webhook_url: String,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub subscription_id: String,
    pub webhook_url: String,
}

/// GET /api/credit/score - Current credit score
pub async fn get_credit_score(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CreditQuery>, QueryRejection>,
    request: Request,
) -> Result<Json<CreditScore>, AppError> {
    let params = query_params(query)?;
    let user_email = get_user_email(request.headers());

    let (score, cached) = match state.score_cache.get(&params.user_id) {
        Some(score) => (score, true),
        None => {
            let score = state
                .credit
                .get_credit_score(&params.user_id)
                .await
                .map_err(AppError::from_core)?;
            state.score_cache.insert(&params.user_id, score.clone());
            (score, false)
        }
    };
    debug!(user_id = %params.user_id, cached, "Served credit score");

    state.db.log_audit(
        &user_email,
        SCORE_ACCESSED_EVENT,
        Some("credit_score"),
        Some(&params.user_id),
        Some(&format!("bureau={}, cached={}", score.bureau, cached)),
    )?;

    Ok(Json(score))
}

/// GET /api/credit/report - Full credit report
pub async fn get_credit_report(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CreditQuery>, QueryRejection>,
    request: Request,
) -> Result<Json<CreditReport>, AppError> {
    let params = query_params(query)?;
    let user_email = get_user_email(request.headers());

    let (report, cached) = match state.report_cache.get(&params.user_id) {
        Some(report) => (report, true),
        None => {
            let report = state
                .credit
                .get_credit_report(&params.user_id)
                .await
                .map_err(AppError::from_core)?;
            state.report_cache.insert(&params.user_id, report.clone());
            (report, false)
        }
    };
    debug!(user_id = %params.user_id, cached, "Served credit report");

    state.db.log_audit(
        &user_email,
        REPORT_ACCESSED_EVENT,
        Some("credit_report"),
        Some(&params.user_id),
        Some(&format!("bureau={}, cached={}", report.bureau, cached)),
    )?;

    Ok(Json(report))
}

/// POST /api/credit/subscribe - Register a score-change webhook
pub async fn subscribe_credit_changes(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SubscribeQuery>, QueryRejection>,
    request: Request,
) -> Result<Json<SubscribeResponse>, AppError> {
    let params = query_params(query)?;
    let user_email = get_user_email(request.headers());

    if !params.webhook_url.starts_with("https://") && !params.webhook_url.starts_with("http://") {
        return Err(AppError::bad_request("webhook_url must be an http(s) URL"));
    }

    let subscription_id = state
        .credit
        .subscribe_to_changes(&params.user_id, &params.webhook_url)
        .await
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &user_email,
        "subscribe",
        Some("credit_subscription"),
        Some(&subscription_id),
        Some(&format!("user_id={}", params.user_id)),
    )?;

    Ok(Json(SubscribeResponse {
        subscription_id,
        webhook_url: params.webhook_url,
    }))
}
