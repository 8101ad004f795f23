//! # slotscan-server
//!
//! HTTP surface for the slotscan availability checker. One synchronous
//! check operation (`/check`) that always answers with a well-formed JSON
//! report, and a fixed liveness endpoint (`/health`). Request validation
//! runs before any browser session is provisioned.

mod server;

pub use server::{router, validate_url, AppState, SharedState};

use slotscan_browser::SessionProvider;
use slotscan_core::ScanConfig;
use std::sync::Arc;
use tracing::info;

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to serve on
    pub port: u16,
    /// Host suffix target URLs must match
    pub allowed_host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            allowed_host: "calendly.com".to_string(),
        }
    }
}

/// Run the HTTP server until shutdown.
pub async fn serve<P>(provider: P, scan: ScanConfig, config: ServerConfig) -> anyhow::Result<()>
where
    P: SessionProvider + Send + Sync + 'static,
{
    let addr = format!("0.0.0.0:{}", config.port);
    info!("Starting slotscan server on {}", addr);

    let state = Arc::new(AppState {
        provider,
        scan,
        allowed_host: config.allowed_host,
    });
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
