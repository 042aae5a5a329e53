//! Infrastructure bootstrap and the serve loop.

use crate::di::AppModule;
use crate::startup::print_startup_info;
use axum::{routing::get, Router};
use gantry_client::HttpPokeApiClient;
use gantry_config::{AppConfig, MetricsConfig, RedisConfig};
use gantry_core::{GantryError, GantryResult};
use gantry_repository::create_pool;
use gantry_rest::{create_router, AppState};
use gantry_service::RedisCacheBackend;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};

const METRICS_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Runs the server until a shutdown signal arrives.
///
/// After the listener stops, detached cache work is drained for at most
/// `server.shutdown_timeout_secs` and the database pool is closed.
pub async fn run(config: AppConfig) -> GantryResult<()> {
    let db_pool = create_pool(&config.database).await?;
    let cache_backend = connect_redis(&config.redis).await?;
    let pokeapi_client = HttpPokeApiClient::new(&config.pokeapi)?;

    let module = AppModule::builder()
        .with_database_pool(db_pool)
        .with_cache_backend(Arc::new(cache_backend))
        .with_cache_config(config.cache.clone())
        .with_pokeapi_client(Arc::new(pokeapi_client))
        .build()?;

    let metrics_server = if config.metrics.enabled {
        Some(start_metrics_server(&config.metrics).await?)
    } else {
        None
    };

    let state = AppState::new(module.provider_service(), module.pokemon_service());
    let router = create_router(state, &config.server, &config.metrics);

    let rest_addr = config.server.addr();
    let listener = TcpListener::bind(&rest_addr)
        .await
        .map_err(|e| GantryError::Internal(format!("Failed to bind REST: {}", e)))?;
    print_startup_info(&config);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| GantryError::Internal(format!("REST server error: {}", e)))?;

    info!(in_flight = module.tasks().in_flight(), "Draining background cache tasks...");
    if !module.tasks().drain(config.server.shutdown_timeout()).await {
        warn!(
            in_flight = module.tasks().in_flight(),
            "Background cache tasks still running after shutdown timeout"
        );
    }

    if let Some(handle) = metrics_server {
        handle.abort();
    }
    if let Some(pool) = module.database_pool() {
        pool.close().await;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Builds the Redis cache backend.
///
/// A failed start-up ping is fatal only when `redis.required` is set;
/// otherwise the backend is kept and its failures are absorbed per call.
pub async fn connect_redis(config: &RedisConfig) -> GantryResult<RedisCacheBackend> {
    if !config.enabled {
        info!("Redis cache disabled");
        return Ok(RedisCacheBackend::disabled());
    }

    let backend = RedisCacheBackend::connect(config)?;
    match backend.ping().await {
        Ok(()) => {
            info!(namespace = %config.namespace, "Redis connection established");
            Ok(backend)
        }
        Err(e) if config.required => Err(e),
        Err(e) => {
            warn!(error = %e, "Redis unavailable at start-up, continuing with a degraded cache");
            Ok(backend)
        }
    }
}

/// Installs the Prometheus recorder and serves it on the metrics listener.
pub async fn start_metrics_server(config: &MetricsConfig) -> GantryResult<JoinHandle<()>> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| GantryError::Internal(format!("Failed to install metrics recorder: {}", e)))?;
    gantry_service::metrics::register_metrics();
    gantry_rest::middleware::register_metrics();

    let listener = TcpListener::bind(config.addr())
        .await
        .map_err(|e| GantryError::Internal(format!("Failed to bind metrics: {}", e)))?;
    info!("Serving metrics on http://{}{}", config.addr(), config.path);

    let router = metrics_router(&config.path, handle.clone());
    Ok(tokio::spawn(async move {
        let upkeep = async {
            let mut interval = tokio::time::interval(METRICS_UPKEEP_INTERVAL);
            loop {
                interval.tick().await;
                handle.run_upkeep();
            }
        };
        tokio::select! {
            result = axum::serve(listener, router) => {
                if let Err(e) = result {
                    warn!("Metrics server error: {}", e);
                }
            }
            () = upkeep => {}
        }
    }))
}

fn metrics_router(path: &str, handle: PrometheusHandle) -> Router {
    Router::new().route(path, get(move || async move { handle.render() }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_service::CacheBackend;

    fn unreachable_redis(required: bool) -> RedisConfig {
        RedisConfig {
            url: "redis://127.0.0.1:1".to_string(),
            required,
            ..RedisConfig::default()
        }
    }

    #[tokio::test]
    async fn test_disabled_redis_yields_disabled_backend() {
        let config = RedisConfig {
            enabled: false,
            ..RedisConfig::default()
        };
        let backend = connect_redis(&config).await.unwrap();
        assert!(!backend.is_enabled());
    }

    #[tokio::test]
    async fn test_unreachable_optional_redis_is_tolerated() {
        let backend = connect_redis(&unreachable_redis(false)).await.unwrap();
        assert!(backend.is_enabled());
        assert!(backend.get_raw("provider:id:x").await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_required_redis_fails_start_up() {
        let err = connect_redis(&unreachable_redis(true)).await.err().unwrap();
        assert!(matches!(err, GantryError::Cache(_)));
    }

    #[tokio::test]
    async fn test_silent_redis_does_not_stall_start_up() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        let config = |required| RedisConfig {
            url: format!("redis://{}", addr),
            required,
            timeout_ms: 100,
            ..RedisConfig::default()
        };

        let bounded = Duration::from_secs(5);
        let optional = tokio::time::timeout(bounded, connect_redis(&config(false))).await.unwrap();
        assert!(optional.unwrap().is_enabled());
        let required = tokio::time::timeout(bounded, connect_redis(&config(true))).await.unwrap();
        assert!(matches!(required.err().unwrap(), GantryError::Cache(_)));
    }

    #[tokio::test]
    async fn test_metrics_router_serves_configured_path() {
        use axum::body::Body;
        use axum::http::{Request, StatusCode};
        use tower::ServiceExt;

        let recorder = PrometheusBuilder::new().build_recorder();
        let router = metrics_router("/scrape", recorder.handle());

        let ok = router
            .clone()
            .oneshot(Request::builder().uri("/scrape").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let missing = router
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
