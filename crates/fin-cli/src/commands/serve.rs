//! Server command implementation

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use fin_core::credit::{easy_credit, CreditConfig};
use fin_core::providers::MockTransactionFeed;
use fin_server::{parse_list, AppState, ServerConfig};

use super::open_db;

/// Build server configuration from `FIN_*` environment variables
pub fn server_config_from_env(no_auth: bool) -> Result<ServerConfig> {
    let defaults = ServerConfig::default();

    let api_keys = parse_list(&std::env::var("FIN_API_KEYS").unwrap_or_default());
    let allowed_origins = parse_list(&std::env::var("FIN_ALLOWED_ORIGINS").unwrap_or_default());

    let credit_cache_ttl = match std::env::var("FIN_CREDIT_CACHE_TTL") {
        Ok(raw) if !raw.trim().is_empty() => Duration::from_secs(
            raw.trim()
                .parse()
                .with_context(|| format!("Invalid FIN_CREDIT_CACHE_TTL: {}", raw))?,
        ),
        _ => defaults.credit_cache_ttl,
    };

    let spending_baseline = match std::env::var("FIN_SPENDING_BASELINE") {
        Ok(raw) if !raw.trim().is_empty() => raw.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        _ => defaults.spending_baseline,
    };

    Ok(ServerConfig {
        require_auth: !no_auth,
        allowed_origins,
        api_keys,
        credit_cache_ttl,
        spending_baseline,
    })
}

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
) -> Result<()> {
    println!("🚀 Starting fin web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    let config = server_config_from_env(no_auth)?;

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        println!(
            "   🔑 API keys: {} configured (FIN_API_KEYS)",
            config.api_keys.len()
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;
    let credit =
        easy_credit("experian", CreditConfig::default()).context("Failed to set up credit provider")?;

    let state = AppState::with_providers(db, config, Arc::new(MockTransactionFeed::new()), credit);

    fin_server::serve(state, host, port).await
}
