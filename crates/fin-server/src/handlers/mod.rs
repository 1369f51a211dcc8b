//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analytics;
pub mod audit;
pub mod budgets;
pub mod credit;
pub mod goals;

// Re-export all handlers for use in router
pub use analytics::*;
pub use audit::*;
pub use budgets::*;
pub use credit::*;
pub use goals::*;

use axum::extract::{rejection::QueryRejection, Query, Request};
use serde::de::DeserializeOwned;

use crate::{AppError, MAX_BODY_SIZE};

/// Read and parse a JSON request body
pub(crate) async fn read_json<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))
}

/// Unwrap query parameters, reporting a malformed query string as a JSON 400
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::bad_request(&rejection.body_text()))
}
