//! OAuth 2.0 client-credentials tokens for the Experian API
//!
//! Tokens are cached in memory and refreshed when they are within five
//! minutes of expiring. The cache sits behind an async mutex so concurrent
//! callers wait on a single refresh instead of each hitting the token
//! endpoint.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Refresh tokens this long before they expire
const EXPIRY_BUFFER_SECS: i64 = 300;

const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(10);

pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

const TOKEN_SCOPE: &str = "read:credit write:credit";

#[derive(Debug, Default)]
struct CachedToken {
    token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    fn valid_token(&self, now: DateTime<Utc>) -> Option<&str> {
        match (&self.token, self.expires_at) {
            (Some(token), Some(expires_at))
                if now + Duration::seconds(EXPIRY_BUFFER_SECS) < expires_at =>
            {
                Some(token.as_str())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// Token manager for the Experian OAuth endpoint
pub struct ExperianAuthManager {
    http_client: Client,
    client_id: String,
    client_secret: String,
    base_url: String,
    token_ttl: i64,
    state: Mutex<CachedToken>,
}

impl ExperianAuthManager {
    pub fn new(client_id: &str, client_secret: &str, base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token_ttl: DEFAULT_TOKEN_TTL_SECS,
            state: Mutex::new(CachedToken::default()),
        }
    }

    /// Lifetime assumed when the token response omits `expires_in`
    pub fn with_token_ttl(mut self, seconds: i64) -> Self {
        self.token_ttl = seconds;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A valid access token, refreshing first if needed
    pub async fn get_token(&self) -> Result<String> {
        let mut state = self.state.lock().await;

        if let Some(token) = state.valid_token(Utc::now()) {
            return Ok(token.to_string());
        }

        let response = self.request_token().await?;
        let expires_in = response.expires_in.unwrap_or(self.token_ttl);
        let expires_at = Duration::try_seconds(expires_in)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| Error::Auth(format!("token expires_in out of range: {}", expires_in)))?;

        state.token = Some(response.access_token.clone());
        state.expires_at = Some(expires_at);

        info!(expires_in, "Acquired Experian access token");
        Ok(response.access_token)
    }

    /// Drop the cached token so the next `get_token` refreshes
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        *state = CachedToken::default();
        debug!("Invalidated Experian access token");
    }

    async fn request_token(&self) -> Result<TokenResponse> {
        debug!(base_url = %self.base_url, "Requesting Experian access token");

        let response = self
            .http_client
            .post(format!("{}/oauth2/v1/token", self.base_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "client_credentials"),
                ("scope", TOKEN_SCOPE),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "token request failed ({}): {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}
