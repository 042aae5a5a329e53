//! Layered loading of [`AppConfig`].

use crate::{AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use gantry_core::GantryError;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Environment variable selecting the `{environment}.toml` overlay.
pub const ENVIRONMENT_VAR: &str = "GANTRY_ENVIRONMENT";

/// Prefix of environment variable overrides, e.g. `GANTRY_REDIS__URL`.
pub const ENV_PREFIX: &str = "GANTRY";

/// Holds the current [`AppConfig`] and can re-read it from disk.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Reads `default.toml`, then `{environment}.toml`, then `local.toml`
    /// from `config_dir`, each optional and each overriding the previous one.
    /// `GANTRY_SECTION__KEY` variables are applied last.
    pub fn new(config_dir: impl Into<String>) -> Result<Self, GantryError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads from `./config`.
    pub fn from_default_location() -> Result<Self, GantryError> {
        Self::new("./config")
    }

    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Re-reads every source. On error the previous configuration stays in place.
    pub async fn reload(&self) -> Result<(), GantryError> {
        let new_config = Self::load_config(&self.config_dir)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    fn load_config(config_dir: &str) -> Result<AppConfig, GantryError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment = std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "development".to_string());
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{}/{}.toml", config_dir, name);
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .with_list_parse_key("metrics.exclude_paths")
                .try_parsing(true),
        );

        let app_config: AppConfig = builder
            .build()
            .and_then(|config| config.try_deserialize::<AppConfig>())
            .map_err(config_error_to_gantry_error)?;

        ConfigValidator::validate(&app_config).map_err(|errors| {
            let message = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            GantryError::Configuration(message)
        })?;

        Ok(app_config)
    }
}

fn config_error_to_gantry_error(err: ConfigError) -> GantryError {
    GantryError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_loads_defaults_from_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::new(dir.path().to_string_lossy()).unwrap();
        let config = loader.get().await;
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.redis.namespace, "gantry");
    }

    #[tokio::test]
    async fn test_local_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 8081\n\n[redis]\nnamespace = \"base\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("local.toml"), "[redis]\nnamespace = \"mine\"\n").unwrap();

        let loader = ConfigLoader::new(dir.path().to_string_lossy()).unwrap();
        let config = loader.get().await;
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.redis.namespace, "mine");
    }

    #[tokio::test]
    async fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[cache]\nentity_ttl_secs = 0\n").unwrap();

        let err = ConfigLoader::new(dir.path().to_string_lossy()).err().unwrap();
        assert!(matches!(err, GantryError::Configuration(ref msg) if msg.contains("entity_ttl_secs")));
    }

    #[tokio::test]
    async fn test_reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.toml");
        fs::write(&path, "[pokeapi]\ntimeout_secs = 3\n").unwrap();

        let loader = ConfigLoader::new(dir.path().to_string_lossy()).unwrap();
        assert_eq!(loader.get().await.pokeapi.timeout_secs, 3);

        fs::write(&path, "[pokeapi]\ntimeout_secs = 7\n").unwrap();
        loader.reload().await.unwrap();
        assert_eq!(loader.get().await.pokeapi.timeout_secs, 7);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.toml");
        fs::write(&path, "[pokeapi]\ntimeout_secs = 3\n").unwrap();

        let loader = ConfigLoader::new(dir.path().to_string_lossy()).unwrap();
        fs::write(&path, "[pokeapi]\ntimeout_secs = 0\n").unwrap();

        assert!(loader.reload().await.is_err());
        assert_eq!(loader.get().await.pokeapi.timeout_secs, 3);
    }
}
