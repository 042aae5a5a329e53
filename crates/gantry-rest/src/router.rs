//! Main application router.

use crate::{
    controllers::{diagnostics_controller, pokemon_controller, provider_controller},
    middleware::{logging_middleware, metrics_middleware, HttpMetrics},
    openapi::ApiDoc,
    state::AppState,
};
use axum::{http::HeaderValue, middleware, routing::get, Router};
use gantry_config::{MetricsConfig, ServerConfig};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Creates the main application router.
pub fn create_router(state: AppState, server_config: &ServerConfig, metrics_config: &MetricsConfig) -> Router {
    let api_router = Router::new()
        .merge(provider_controller::router())
        .merge(pokemon_controller::router())
        .with_state(state);

    let mut router = Router::new()
        // API v1
        .nest("/v1", api_router)
        // Swagger UI and the OpenAPI document
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Root endpoint
        .route("/", get(root));

    if server_config.diagnostics_enabled {
        router = router.merge(diagnostics_controller::router());
    }

    if metrics_config.enabled {
        router = router.route_layer(middleware::from_fn_with_state(
            HttpMetrics::from_config(metrics_config),
            metrics_middleware,
        ));
    }

    let router = router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(create_cors_layer(server_config))
            .layer(middleware::from_fn(logging_middleware))
            .layer(TimeoutLayer::new(server_config.request_timeout()))
            .layer(PropagateRequestIdLayer::x_request_id()),
    );

    info!("Router created with REST endpoints and Swagger UI at /swagger-ui");
    router
}

/// Creates a CORS layer based on server configuration.
fn create_cors_layer(server_config: &ServerConfig) -> CorsLayer {
    if !server_config.cors_enabled {
        return CorsLayer::new();
    }

    if server_config.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server_config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Root endpoint handler.
async fn root() -> &'static str {
    "Gantry API v1"
}
