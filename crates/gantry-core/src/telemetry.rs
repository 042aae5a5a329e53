//! Process-wide `tracing` subscriber setup.

#[cfg(feature = "telemetry")]
use opentelemetry::trace::TracerProvider;
#[cfg(feature = "telemetry")]
use opentelemetry::KeyValue;
#[cfg(feature = "telemetry")]
use opentelemetry_otlp::WithExportConfig;
#[cfg(feature = "telemetry")]
use opentelemetry_sdk::{
    runtime,
    trace::{RandomIdGenerator, Sampler},
    Resource,
};
#[cfg(feature = "telemetry")]
use opentelemetry_semantic_conventions::resource::SERVICE_NAME;
#[cfg(feature = "telemetry")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::GantryResult;
use serde::{Deserialize, Serialize};

/// Console log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// `[observability]` section of the application config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Default filter directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Console output format.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Attach the OpenTelemetry layer.
    #[serde(default)]
    pub enabled: bool,

    /// `service.name` resource attribute.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// gRPC collector address, e.g. `http://localhost:4317`.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,

    /// Fraction of traces kept, clamped to `[0, 1]`.
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_log_level() -> String {
    "info,gantry=debug,tower_http=debug".to_string()
}

fn default_service_name() -> String {
    "gantry".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            enabled: false,
            service_name: default_service_name(),
            otlp_endpoint: None,
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// `RUST_LOG` wins over `log_level`. Span export is only wired when
/// `enabled` is set; without an `otlp_endpoint` spans are sampled but kept
/// in-process.
#[cfg(feature = "telemetry")]
pub fn init_telemetry(config: &TelemetryConfig) -> GantryResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let console = match config.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(true).boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().with_target(true).boxed(),
    };

    let otel = if config.enabled {
        let provider = build_tracer_provider(config)?;
        let tracer = provider.tracer("gantry");
        opentelemetry::global::set_tracer_provider(provider);
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(otel)
        .try_init()
        .map_err(|e| crate::GantryError::Internal(format!("Failed to install subscriber: {}", e)))?;

    if config.enabled {
        tracing::info!(
            service_name = %config.service_name,
            sampling_ratio = config.sampling_ratio,
            otlp_endpoint = ?config.otlp_endpoint,
            "Span export enabled"
        );
    }
    Ok(())
}

#[cfg(feature = "telemetry")]
fn build_tracer_provider(config: &TelemetryConfig) -> GantryResult<opentelemetry_sdk::trace::TracerProvider> {
    let mut builder = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_sampler(sampler_for(config.sampling_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(Resource::new(vec![KeyValue::new(
            SERVICE_NAME,
            config.service_name.clone(),
        )]));

    if let Some(endpoint) = &config.otlp_endpoint {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()
            .map_err(|e| crate::GantryError::Internal(format!("Failed to create OTLP exporter: {}", e)))?;
        builder = builder.with_batch_exporter(exporter, runtime::Tokio);
    }

    Ok(builder.build())
}

#[cfg(feature = "telemetry")]
fn sampler_for(ratio: f64) -> Sampler {
    match ratio {
        r if r >= 1.0 => Sampler::AlwaysOn,
        r if r <= 0.0 => Sampler::AlwaysOff,
        r => Sampler::TraceIdRatioBased(r),
    }
}

/// Flushes buffered spans. Call once, after the server has stopped.
#[cfg(feature = "telemetry")]
pub fn shutdown_telemetry() {
    opentelemetry::global::shutdown_tracer_provider();
}

#[cfg(not(feature = "telemetry"))]
pub fn init_telemetry(_config: &TelemetryConfig) -> GantryResult<()> {
    Ok(())
}

#[cfg(not(feature = "telemetry"))]
pub fn shutdown_telemetry() {}
