//! Test utilities for fin-core
//!
//! This module provides a mock credit bureau OAuth server that can be used for
//! development and integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use base64::Engine;
use serde_json::json;
use tokio::sync::oneshot;

/// Credentials the mock server accepts
pub const MOCK_CLIENT_ID: &str = "client";
pub const MOCK_CLIENT_SECRET: &str = "secret";

struct MockState {
    token_requests: AtomicUsize,
    expires_in: Option<i64>,
}

/// Mock OAuth 2.0 token endpoint (`POST /oauth2/v1/token`)
///
/// Issues a fresh `mock_token_<n>` for every accepted request and counts
/// requests so tests can assert on caching.
pub struct MockOAuthServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOAuthServer {
    /// Start the mock server on an available port, issuing 1-hour tokens
    pub async fn start() -> Self {
        Self::start_with_expires_in(Some(3600)).await
    }

    /// Start with a custom `expires_in` (`None` omits the field)
    pub async fn start_with_expires_in(expires_in: Option<i64>) -> Self {
        let state = Arc::new(MockState {
            token_requests: AtomicUsize::new(0),
            expires_in,
        });

        let app = Router::new()
            .route("/oauth2/v1/token", post(handle_token))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Token requests received so far, including rejected ones
    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOAuthServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_token(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let n = state.token_requests.fetch_add(1, Ordering::SeqCst) + 1;

    if basic_credentials(&headers) != Some((MOCK_CLIENT_ID.into(), MOCK_CLIENT_SECRET.into())) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid_client" })),
        )
            .into_response();
    }

    if form.get("grant_type").map(String::as_str) != Some("client_credentials") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unsupported_grant_type" })),
        )
            .into_response();
    }

    let mut body = json!({
        "access_token": format!("mock_token_{}", n),
        "token_type": "Bearer",
        "scope": form.get("scope").cloned().unwrap_or_default(),
    });
    if let Some(expires_in) = state.expires_in {
        body["expires_in"] = json!(expires_in);
    }

    Json(body).into_response()
}

/// Decode `Authorization: Basic <base64(id:secret)>`
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (id, secret) = decoded.split_once(':')?;
    Some((id.to_string(), secret.to_string()))
}
