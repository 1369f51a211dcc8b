//! Audit log handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, Request, State},
    Json,
};
use serde::Deserialize;

use super::query_params;
use crate::{get_user_email, AppError, AppState, MAX_PAGE_LIMIT};
use fin_core::AuditEntry;

/// Query parameters for audit log
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_audit_limit")]
    pub limit: i64,
    /// Only entries with this action
    pub action: Option<String>,
}

fn default_audit_limit() -> i64 {
    100
}

/// GET /api/audit - List audit log entries
pub async fn list_audit_log(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AuditQuery>, QueryRejection>,
    request: Request,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let params = query_params(query)?;
    let user_email = get_user_email(request.headers());
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);

    let entries = match params.action.as_deref() {
        Some(action) => state.db.list_audit_by_action(action, limit)?,
        None => state.db.list_audit_log(limit)?,
    };

    // Audit log - viewing the audit log itself
    state.db.log_audit(
        &user_email,
        "list",
        Some("audit_log"),
        None,
        Some(&format!("limit={}", limit)),
    )?;

    Ok(Json(entries))
}
