//! Reverse proxy in front of the VO2 metrics API
//!
//! Browsers call `/api/vo2/{endpoint}`; the proxy injects the API key, keeps
//! only an allow-list of headers in both directions and adds CORS headers.

pub mod error;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{routing::get, Router};
use tokio::net::TcpListener;

use crate::config::{AppConfig, UpstreamSettings};
use crate::error::ClientError;

pub use error::ProxyError;

/// Path prefix of proxied requests
pub const PROXY_PREFIX: &str = "/api/vo2";

/// Shared, read-only proxy state
pub struct ProxyState {
    pub upstream: UpstreamSettings,
    pub http: reqwest::Client,
}

impl ProxyState {
    pub fn new(upstream: UpstreamSettings, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(ProxyState { upstream, http })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.upstream
            .base_url
            .as_deref()
            .filter(|_| self.upstream.has_base_url())
    }

    pub fn api_key(&self) -> Option<&str> {
        self.upstream
            .api_key
            .as_deref()
            .filter(|_| self.upstream.has_api_key())
    }
}

pub fn router(state: Arc<ProxyState>) -> Router {
    let proxied = get(handlers::forward)
        .post(handlers::forward)
        .put(handlers::forward)
        .delete(handlers::forward)
        .options(handlers::preflight);

    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/vo2", proxied.clone())
        .route("/api/vo2/", proxied.clone())
        .route("/api/vo2/*endpoint", proxied)
        .with_state(state)
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

/// Run the proxy until Ctrl+C or SIGTERM
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let state = ProxyState::new(
        config.upstream.clone(),
        Duration::from_secs(config.server.upstream_timeout_secs),
    )
    .context("Failed to build the upstream HTTP client")?;

    if !state.upstream.is_configured() {
        tracing::warn!("Upstream base URL or API key missing; proxied requests will fail with 500");
    }

    let app = router(Arc::new(state));
    let listener = TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    tracing::info!(addr = %listener.local_addr()?, "Proxy listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Proxy server failed")?;

    Ok(())
}
