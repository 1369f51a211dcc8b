//! fin-infra Web Server
//!
//! Axum-based REST API over the fin-core building blocks: budgets, spending
//! analytics, credit bureau access and goal planning.
//!
//! Security features:
//! - API key authentication (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Full audit logging for all API access (reads and writes)
//! - Sanitized error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use fin_core::analytics::{AnalyzerConfig, Baseline, SpendingAnalyzer};
use fin_core::budgets::BudgetTracker;
use fin_core::credit::{
    CreditReport, CreditScore, Environment, ExperianProvider, ResponseCache, DEFAULT_CACHE_TTL,
};
use fin_core::db::Database;
use fin_core::providers::{CreditProvider, MockTransactionFeed, TransactionFeed};

mod handlers;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Maximum accepted JSON body (64 KB)
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// API keys accepted as "Bearer <key>" in the Authorization header
    pub api_keys: Vec<String>,
    /// How long credit scores and reports are served from cache
    pub credit_cache_ttl: Duration,
    /// Comparison baseline for spending trends and anomalies
    pub spending_baseline: Baseline,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
            credit_cache_ttl: DEFAULT_CACHE_TTL,
            spending_baseline: Baseline::default(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub budgets: BudgetTracker,
    pub analyzer: SpendingAnalyzer,
    pub credit: Arc<dyn CreditProvider>,
    pub score_cache: ResponseCache<CreditScore>,
    pub report_cache: ResponseCache<CreditReport>,
}

impl AppState {
    /// State backed by the mock transaction feed and sample Experian data
    pub fn new(db: Database, config: ServerConfig) -> Self {
        Self::with_providers(
            db,
            config,
            Arc::new(MockTransactionFeed::new()),
            Arc::new(ExperianProvider::new(None, Environment::Sandbox)),
        )
    }

    pub fn with_providers(
        db: Database,
        config: ServerConfig,
        feed: Arc<dyn TransactionFeed>,
        credit: Arc<dyn CreditProvider>,
    ) -> Self {
        let analyzer = SpendingAnalyzer::new(feed.clone()).with_config(AnalyzerConfig {
            baseline: config.spending_baseline,
            ..Default::default()
        });

        Self {
            budgets: BudgetTracker::new(db.clone(), feed),
            analyzer,
            credit,
            score_cache: ResponseCache::new(config.credit_cache_ttl),
            report_cache: ResponseCache::new(config.credit_cache_ttl),
            db,
            config,
        }
    }
}

/// Authentication middleware - validates the Bearer API key
///
/// API keys are compared in constant time to prevent timing attacks.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    let api_key_valid = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|key| validate_api_key(key, &state.config.api_keys))
        .unwrap_or(false);

    if api_key_valid {
        info!(user = "api-key", path = %request.uri().path(), "Authenticated via API key");
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Validate an API key against the configured keys using constant-time comparison
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    valid_keys.iter().any(|key| {
        let key_bytes = key.as_bytes();
        // Only compare if lengths match (constant-time for same-length keys)
        provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes))
    })
}

/// Parse a comma-separated list (API keys, origins), dropping blanks
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Identify the caller for audit logging
/// Returns "api-key" for API key auth, or "local-dev" for unauthenticated
pub fn get_user_email(headers: &axum::http::HeaderMap) -> String {
    if headers
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .is_some()
    {
        return "api-key".to_string();
    }

    "local-dev".to_string()
}

/// Create the application router with the default (mock) providers
pub fn create_router(db: Database, config: ServerConfig) -> Router {
    router_with_state(AppState::new(db, config))
}

/// Create the application router over prepared state
pub fn router_with_state(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);
    let state = Arc::new(state);

    let api_routes = Router::new()
        // Budgets
        .route(
            "/budgets",
            get(handlers::list_budgets).post(handlers::create_budget),
        )
        .route("/budgets/templates/list", get(handlers::list_templates))
        .route(
            "/budgets/from-template",
            post(handlers::create_budget_from_template),
        )
        .route(
            "/budgets/:id",
            get(handlers::get_budget)
                .patch(handlers::update_budget)
                .delete(handlers::delete_budget),
        )
        .route("/budgets/:id/progress", get(handlers::get_budget_progress))
        .route("/budgets/:id/alerts", get(handlers::get_budget_alerts))
        // Credit
        .route("/credit/score", get(handlers::get_credit_score))
        .route("/credit/report", get(handlers::get_credit_report))
        .route("/credit/subscribe", post(handlers::subscribe_credit_changes))
        // Analytics
        .route("/analytics/spending", get(handlers::get_spending_insights))
        // Goals
        .route("/goals/validate", post(handlers::validate_goal))
        .route("/goals/progress", post(handlers::goal_progress))
        .route("/goals/calculate", post(handlers::calculate_goal))
        // Audit
        .route("/audit", get(handlers::list_audit_log));

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        return layer;
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    layer.allow_origin(origins)
}

/// Start the server
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    if !state.config.require_auth {
        warn!("Authentication disabled - do not expose to network!");
    } else if state.config.api_keys.is_empty() {
        warn!("No API keys configured (FIN_API_KEYS); every request will be rejected");
    }

    info!(
        bureau = state.credit.bureau(),
        cache_ttl_secs = state.config.credit_cache_ttl.as_secs(),
        "Credit provider ready"
    );

    let app = router_with_state(state);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map core errors: invalid input is a 400, a missing record a 404
    pub fn from_core(err: fin_core::Error) -> Self {
        match err {
            fin_core::Error::InvalidData(msg) => Self::bad_request(&msg),
            fin_core::Error::NotFound(msg) => Self::not_found(&msg),
            other => Self::from(other),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
