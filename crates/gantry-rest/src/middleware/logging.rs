//! Access log.

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// Set by `SetRequestIdLayer` before this middleware runs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_owned()
}

/// One line per request; 5xx answers are logged at `warn`.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request_id(request.headers());

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis();
    if response.status().is_server_error() {
        warn!(target: "http", %method, %uri, %request_id, status, elapsed_ms, "request failed");
    } else {
        info!(target: "http", %method, %uri, %request_id, status, elapsed_ms, "request served");
    }
    response
}
