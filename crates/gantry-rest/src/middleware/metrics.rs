//! HTTP request metrics middleware.

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use gantry_config::MetricsConfig;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::sync::Arc;
use std::time::Instant;

/// Metric names for the HTTP layer.
pub mod names {
    /// Total HTTP requests.
    pub const HTTP_REQUESTS_TOTAL: &str = "gantry_http_requests_total";
    /// HTTP request duration in seconds.
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "gantry_http_request_duration_seconds";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(names::HTTP_REQUESTS_TOTAL, "Total number of HTTP requests");
    describe_histogram!(
        names::HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );
}

/// Settings of the metrics middleware.
#[derive(Debug, Clone)]
pub struct HttpMetrics {
    exclude_paths: Arc<[String]>,
    group_status: bool,
}

impl HttpMetrics {
    /// Builds the middleware settings from configuration.
    #[must_use]
    pub fn from_config(config: &MetricsConfig) -> Self {
        Self {
            exclude_paths: config.exclude_paths.clone().into(),
            group_status: config.group_status,
        }
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.exclude_paths.iter().any(|excluded| excluded == path)
    }

    fn status_label(&self, status: StatusCode) -> String {
        if self.group_status {
            format!("{}xx", status.as_u16() / 100)
        } else {
            status.as_u16().to_string()
        }
    }
}

/// Records request count and latency, labelled by method, route and status.
///
/// The route label is the matched route template (`/v1/provider/:id`), so
/// ids never become label values.
pub async fn metrics_middleware(State(settings): State<HttpMetrics>, request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_string(), |matched| matched.as_str().to_string());

    if settings.is_excluded(&path) {
        return next.run(request).await;
    }

    let method = request.method().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let labels = [
        ("method", method),
        ("path", path),
        ("status", settings.status_label(response.status())),
    ];
    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(start.elapsed().as_secs_f64());

    response
}
