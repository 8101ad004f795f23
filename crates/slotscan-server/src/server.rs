//! Axum routes for the availability checker

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use slotscan_browser::{checker, SessionProvider};
use slotscan_core::{AvailabilityReport, ScanConfig};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;
use url::Url;

/// Shared application state
pub struct AppState<P> {
    pub provider: P,
    pub scan: ScanConfig,
    /// Host suffix a target URL must match before a session is provisioned.
    pub allowed_host: String,
}

pub type SharedState<P> = Arc<AppState<P>>;

#[derive(Debug, Deserialize)]
pub struct CheckParams {
    url: Option<String>,
}

type ClientError = (StatusCode, Json<serde_json::Value>);

pub fn router<P>(state: SharedState<P>) -> Router
where
    P: SessionProvider + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(home))
        .route("/check", get(check_get::<P>).post(check_post::<P>))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET / - service and usage description
async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "slotscan availability checker",
        "usage": {
            "GET": "/check?url=<scheduling page url>",
            "POST": "/check with JSON {\"url\": \"<scheduling page url>\"}"
        }
    }))
}

/// GET /health - fixed liveness answer, independent of browser state
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "slotscan"
    }))
}

/// GET /check?url=...
async fn check_get<P>(
    State(state): State<SharedState<P>>,
    Query(params): Query<CheckParams>,
) -> Result<Json<AvailabilityReport>, ClientError>
where
    P: SessionProvider + Send + Sync + 'static,
{
    run_validated(state, params.url).await
}

/// POST /check with JSON body {"url": "..."}
async fn check_post<P>(
    State(state): State<SharedState<P>>,
    Json(params): Json<CheckParams>,
) -> Result<Json<AvailabilityReport>, ClientError>
where
    P: SessionProvider + Send + Sync + 'static,
{
    run_validated(state, params.url).await
}

async fn run_validated<P>(
    state: SharedState<P>,
    raw: Option<String>,
) -> Result<Json<AvailabilityReport>, ClientError>
where
    P: SessionProvider + Send + Sync + 'static,
{
    // Validation rejects before any browser side effect.
    let url = validate_url(raw.as_deref(), &state.allowed_host).map_err(|message| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": message })),
        )
    })?;

    // The scrape is a long blocking drive of a Chrome process; it runs on
    // the blocking pool so one slow check never stalls the runtime.
    let report = tokio::task::spawn_blocking(move || {
        checker::run_check(&state.provider, url.as_str(), &state.scan)
    })
    .await
    .unwrap_or_else(|e| {
        warn!("Check task aborted: {}", e);
        AvailabilityReport::failed(format!("check task aborted: {}", e))
    });

    Ok(Json(report))
}

/// Reject missing or malformed URLs, and hosts outside the allow-list.
/// Accepts the allowed host itself and its subdomains.
pub fn validate_url(raw: Option<&str>, allowed_host: &str) -> Result<Url, String> {
    let raw = raw.ok_or_else(|| "no url provided".to_string())?;

    let url = Url::parse(raw).map_err(|e| format!("invalid url: {}", e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported url scheme: {}", url.scheme()));
    }

    let host = url.host_str().ok_or_else(|| "url has no host".to_string())?;
    if host != allowed_host && !host.ends_with(&format!(".{}", allowed_host)) {
        return Err(format!("host {} is not an allowed scheduling host", host));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_missing_url() {
        assert!(validate_url(None, "calendly.com").is_err());
    }

    #[test]
    fn test_validate_rejects_malformed_url() {
        assert!(validate_url(Some("not a url"), "calendly.com").is_err());
        assert!(validate_url(Some("file:///etc/passwd"), "calendly.com").is_err());
    }

    #[test]
    fn test_validate_rejects_foreign_host() {
        assert!(validate_url(Some("https://example.com/acme"), "calendly.com").is_err());
        // A lookalike prefix is not a subdomain.
        assert!(validate_url(Some("https://notcalendly.com/acme"), "calendly.com").is_err());
    }

    #[test]
    fn test_validate_accepts_host_and_subdomains() {
        assert!(validate_url(Some("https://calendly.com/acme/intro"), "calendly.com").is_ok());
        assert!(validate_url(Some("https://www.calendly.com/acme"), "calendly.com").is_ok());
    }
}
