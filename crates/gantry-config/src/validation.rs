//! Cross-field checks run once after deserialization.

use crate::AppConfig;
use gantry_core::telemetry::TelemetryConfig;
use std::fmt;
use url::Url;

/// One rejected setting. [`ConfigValidator::validate`] reports all of them at once.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    InvalidPort { name: String, value: u16 },
    /// REST and metrics listeners would bind the same address.
    PortConflict { rest: u16, metrics: u16 },
    InvalidPoolSize { min: u32, max: u32 },
    PoolSizeTooLarge { value: u32, maximum: u32 },
    InvalidUrl { url_type: String, message: String },
    NonPositiveTimeout { name: String, value: u64 },
    ZeroTtl { name: String },
    /// Listings must not outlive the entities they reference.
    TtlOrdering { entity: u64, listing: u64 },
    InvalidMetricsPath { value: String },
    InvalidSamplingRatio { value: f64 },
    InvalidLogLevel { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { name, value } => {
                write!(f, "Invalid port for {}: {} (must be 1-65535)", name, value)
            }
            Self::PortConflict { rest, metrics } => {
                write!(
                    f,
                    "REST port ({}) and metrics port ({}) cannot be the same",
                    rest, metrics
                )
            }
            Self::InvalidPoolSize { min, max } => {
                write!(
                    f,
                    "Invalid pool size: min ({}) cannot be greater than max ({})",
                    min, max
                )
            }
            Self::PoolSizeTooLarge { value, maximum } => {
                write!(f, "Pool size {} exceeds maximum allowed ({})", value, maximum)
            }
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::NonPositiveTimeout { name, value } => {
                write!(f, "Timeout '{}' must be positive, got {}", name, value)
            }
            Self::ZeroTtl { name } => write!(f, "Cache TTL '{}' must be positive", name),
            Self::TtlOrdering { entity, listing } => {
                write!(
                    f,
                    "Listing TTL ({}s) cannot exceed entity TTL ({}s)",
                    listing, entity
                )
            }
            Self::InvalidMetricsPath { value } => {
                write!(f, "Metrics path must start with '/': '{}'", value)
            }
            Self::InvalidSamplingRatio { value } => {
                write!(
                    f,
                    "Invalid sampling ratio: {} (must be between 0.0 and 1.0)",
                    value
                )
            }
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{}' (valid: trace, debug, info, warn, error, off)",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

pub struct ConfigValidator;

impl ConfigValidator {
    const MAX_POOL_SIZE: u32 = 1000;
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error", "off"];

    /// Checks every section and collects all failures instead of stopping at the first.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_server(config, &mut errors);
        Self::validate_database(&config.database, &mut errors);
        Self::validate_redis(&config.redis, &mut errors);
        Self::validate_cache(&config.cache, &mut errors);
        Self::validate_pokeapi(&config.pokeapi, &mut errors);
        Self::validate_observability(&config.observability, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let server = &config.server;
        let metrics = &config.metrics;

        if server.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                name: "server.port".to_string(),
                value: server.port,
            });
        }
        if server.request_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "server.request_timeout_secs".to_string(),
                value: 0,
            });
        }

        if !metrics.enabled {
            return;
        }
        if metrics.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                name: "metrics.port".to_string(),
                value: metrics.port,
            });
        }
        if metrics.host == server.host && metrics.port == server.port {
            errors.push(ConfigValidationError::PortConflict {
                rest: server.port,
                metrics: metrics.port,
            });
        }
        if !metrics.path.starts_with('/') {
            errors.push(ConfigValidationError::InvalidMetricsPath {
                value: metrics.path.clone(),
            });
        }
    }

    fn validate_database(config: &crate::DatabaseConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.url.is_empty() {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        } else if !config.url.starts_with("mysql://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL must start with mysql://".to_string(),
            });
        }

        if config.min_connections > config.max_connections {
            errors.push(ConfigValidationError::InvalidPoolSize {
                min: config.min_connections,
                max: config.max_connections,
            });
        }
        if config.max_connections > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: config.max_connections,
                maximum: Self::MAX_POOL_SIZE,
            });
        }

        if config.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "database.connect_timeout_secs".to_string(),
                value: 0,
            });
        }
        if config.idle_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "database.idle_timeout_secs".to_string(),
                value: 0,
            });
        }
    }

    fn validate_redis(config: &crate::RedisConfig, errors: &mut Vec<ConfigValidationError>) {
        if !config.enabled {
            return;
        }

        if !config.url.starts_with("redis://") && !config.url.starts_with("rediss://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            });
        }

        if config.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: config.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
        if config.timeout_ms == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "redis.timeout_ms".to_string(),
                value: 0,
            });
        }
    }

    fn validate_cache(config: &crate::CacheConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.entity_ttl_secs == 0 {
            errors.push(ConfigValidationError::ZeroTtl {
                name: "cache.entity_ttl_secs".to_string(),
            });
        }
        if config.listing_ttl_secs == 0 {
            errors.push(ConfigValidationError::ZeroTtl {
                name: "cache.listing_ttl_secs".to_string(),
            });
        }
        if config.listing_ttl_secs > config.entity_ttl_secs {
            errors.push(ConfigValidationError::TtlOrdering {
                entity: config.entity_ttl_secs,
                listing: config.listing_ttl_secs,
            });
        }
    }

    fn validate_pokeapi(config: &crate::PokeApiConfig, errors: &mut Vec<ConfigValidationError>) {
        if let Err(e) = Url::parse(&config.base_url) {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "pokeapi".to_string(),
                message: e.to_string(),
            });
        }
        if config.timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "pokeapi.timeout_secs".to_string(),
                value: 0,
            });
        }
    }

    fn validate_observability(config: &TelemetryConfig, errors: &mut Vec<ConfigValidationError>) {
        // Directives look like `info,gantry=debug`; only the level part is checked.
        let levels_ok = config.log_level.split(',').all(|directive| {
            let level = directive.rsplit('=').next().unwrap_or_default().trim().to_lowercase();
            Self::VALID_LOG_LEVELS.contains(&level.as_str())
        });
        if !levels_ok {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }

        if !(0.0..=1.0).contains(&config.sampling_ratio) {
            errors.push(ConfigValidationError::InvalidSamplingRatio {
                value: config.sampling_ratio,
            });
        }

        if let Some(ref endpoint) = config.otlp_endpoint {
            if Url::parse(endpoint).is_err() {
                errors.push(ConfigValidationError::InvalidUrl {
                    url_type: "otlp_endpoint".to_string(),
                    message: format!("Invalid URL format: {}", endpoint),
                });
            }
        }
    }
}
