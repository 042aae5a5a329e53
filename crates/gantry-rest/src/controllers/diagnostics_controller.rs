//! Diagnostics routes under `/_/`: health, simulated status codes and
//! simulated latency.

use axum::{extract::Path, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::time::Duration;
use tracing::warn;
use utoipa::ToSchema;

/// Upper bound on `/_/latency/{seconds}`.
pub const MAX_SIMULATED_LATENCY: Duration = Duration::from_secs(60);

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Application version.
    pub version: String,
}

/// Creates the diagnostics router.
pub fn router() -> Router {
    Router::new()
        .route("/_/health", get(health_check))
        .route("/_/status/:code", get(simulate_status).post(simulate_status))
        .route("/_/latency/:seconds", get(simulate_latency).post(simulate_latency))
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/_/health",
    tag = "diagnostics",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Responds with the requested status code and its reason phrase.
#[utoipa::path(
    get,
    path = "/_/status/{code}",
    tag = "diagnostics",
    params(("code" = String, Path, description = "HTTP status code to respond with")),
    responses(
        (status = 200, description = "The requested status, with its reason phrase as body"),
        (status = 400, description = "Not a known status code")
    )
)]
pub async fn simulate_status(Path(code): Path<String>) -> impl IntoResponse {
    let status = simulated_status(&code);
    if status.is_server_error() {
        warn!(status = status.as_u16(), "Simulated server error");
    }
    (status, status.canonical_reason().unwrap_or_default())
}

/// Sleeps for the requested number of seconds, capped at one minute.
#[utoipa::path(
    get,
    path = "/_/latency/{seconds}",
    tag = "diagnostics",
    params(("seconds" = String, Path, description = "Seconds to wait before responding")),
    responses(
        (status = 200, description = "Waited for the requested time"),
        (status = 400, description = "Not a number of seconds")
    )
)]
pub async fn simulate_latency(Path(seconds): Path<String>) -> impl IntoResponse {
    let Some(latency) = simulated_latency(&seconds) else {
        return (StatusCode::BAD_REQUEST, "Bad Request");
    };
    tokio::time::sleep(latency).await;
    (StatusCode::OK, "OK")
}

/// Parses a status code; anything that is not a final status with a known
/// reason phrase becomes 400.
fn simulated_status(code: &str) -> StatusCode {
    code.parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .filter(|status| !status.is_informational() && status.canonical_reason().is_some())
        .unwrap_or(StatusCode::BAD_REQUEST)
}

fn simulated_latency(seconds: &str) -> Option<Duration> {
    seconds
        .parse::<u64>()
        .ok()
        .map(|seconds| Duration::from_secs(seconds).min(MAX_SIMULATED_LATENCY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_status() {
        assert_eq!(simulated_status("200"), StatusCode::OK);
        assert_eq!(simulated_status("418"), StatusCode::IM_A_TEAPOT);
        assert_eq!(simulated_status("503"), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(simulated_status("599"), StatusCode::BAD_REQUEST);
        assert_eq!(simulated_status("100"), StatusCode::BAD_REQUEST);
        assert_eq!(simulated_status("abc"), StatusCode::BAD_REQUEST);
        assert_eq!(simulated_status("-1"), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_simulated_latency_is_capped() {
        assert_eq!(simulated_latency("0"), Some(Duration::ZERO));
        assert_eq!(simulated_latency("3"), Some(Duration::from_secs(3)));
        assert_eq!(simulated_latency("3600"), Some(MAX_SIMULATED_LATENCY));
        assert_eq!(simulated_latency("soon"), None);
    }
}
