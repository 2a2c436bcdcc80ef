//! Serving module
//!
//! A single HTTP endpoint that takes a predict request, runs it through the
//! pipeline and answers with the augmented table.

mod api;
mod error;
mod handlers;
pub mod pipeline;
mod state;

pub use api::create_router;
pub use error::Diagnostic;
pub use pipeline::{run_predict, PredictRequest};
pub use state::AppState;

use axum::http::Method;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Deployment region used when `GCP_DEFAULT_REGION` is unset
pub const DEFAULT_REGION: &str = "us-east-1";

/// Model cache lifetime used when `MODEL_CACHE_TTL_SECS` is unset
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory relative model URIs are resolved against
    pub model_root: Option<String>,
    pub cache_ttl_secs: u64,
    pub max_body_size: usize,
    /// Methods the endpoint answers; empty means any method
    pub allowed_methods: Vec<Method>,
    /// Answer failures with 4xx/5xx instead of 200
    pub error_status_codes: bool,
    pub region: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            model_root: std::env::var("MODEL_ROOT").ok().filter(|s| !s.is_empty()),
            cache_ttl_secs: std::env::var("MODEL_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CACHE_TTL_SECS),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100 * 1024 * 1024), // 100MB
            allowed_methods: std::env::var("ALLOWED_METHODS")
                .map(|s| parse_methods(&s))
                .unwrap_or_default(),
            error_status_codes: std::env::var("ERROR_STATUS_CODES")
                .map(|s| matches!(s.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            region: std::env::var("GCP_DEFAULT_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
        }
    }
}

impl ServerConfig {
    /// Builder method to set the model cache lifetime
    pub fn with_cache_ttl(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// Builder method to resolve relative model URIs against a directory
    pub fn with_model_root(mut self, root: impl Into<String>) -> Self {
        self.model_root = Some(root.into());
        self
    }

    /// Builder method to restrict the endpoint to the given methods
    pub fn with_allowed_methods(mut self, methods: Vec<Method>) -> Self {
        self.allowed_methods = methods;
        self
    }

    /// Builder method to switch failures to proper HTTP status codes
    pub fn with_error_status_codes(mut self, enabled: bool) -> Self {
        self.error_status_codes = enabled;
        self
    }

    /// Whether the endpoint answers `method`
    pub fn allows(&self, method: &Method) -> bool {
        self.allowed_methods.is_empty() || self.allowed_methods.contains(method)
    }
}

/// Parse a comma-separated method list such as `"POST, get"`.
/// Unparseable entries are skipped.
pub fn parse_methods(list: &str) -> Vec<Method> {
    list.split(',')
        .map(|m| m.trim().to_ascii_uppercase())
        .filter(|m| !m.is_empty())
        .filter_map(|m| Method::from_bytes(m.as_bytes()).ok())
        .collect()
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();

    if let Some(ref root) = config.model_root {
        if !std::path::Path::new(root).is_dir() {
            warn!(model_root = %root, "Model root directory not found, relative model URIs will fail to load");
        }
    }

    let state = Arc::new(AppState::new(config.clone()));
    let app = create_router(Arc::clone(&state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let methods: Vec<&str> = config.allowed_methods.iter().map(Method::as_str).collect();
    info!(
        address = %addr,
        region = %config.region,
        cache_ttl_secs = config.cache_ttl_secs,
        max_body_size_mb = config.max_body_size / 1024 / 1024,
        allowed_methods = ?methods,
        error_status_codes = config.error_status_codes,
        started_at = %start_time.to_rfc3339(),
        "Prediction server starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    let shutdown_state = Arc::clone(&state);
    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl+c, shutting down");
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        let stats = shutdown_state.cache.stats();
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            model_loads = stats.loads,
            cache_hits = stats.hits,
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_body_size, 100 * 1024 * 1024);
        assert_eq!(config.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
        assert!(config.allows(&Method::DELETE));
    }

    #[test]
    fn test_parse_methods() {
        assert_eq!(parse_methods("post, get,,"), vec![Method::POST, Method::GET]);
        assert!(parse_methods("").is_empty());
    }

    #[test]
    fn test_allowed_methods() {
        let config = ServerConfig::default().with_allowed_methods(vec![Method::POST]);
        assert!(config.allows(&Method::POST));
        assert!(!config.allows(&Method::GET));
    }
}
