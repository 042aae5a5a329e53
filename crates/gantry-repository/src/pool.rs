//! MySQL connection pool.

use async_trait::async_trait;
use gantry_config::DatabaseConfig;
use gantry_core::{GantryError, GantryResult, Interface};
use sqlx::migrate::Migrator;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Schema migrations embedded at build time.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Pool handle shared by the repositories.
#[async_trait]
pub trait DatabasePoolInterface: Interface + Send + Sync {
    fn inner(&self) -> &MySqlPool;

    /// Round-trips a `SELECT 1`.
    async fn health_check(&self) -> GantryResult<()>;

    /// Applies pending migrations from [`MIGRATOR`].
    async fn run_migrations(&self) -> GantryResult<()>;

    /// Waits for checked-out connections to be returned, then closes them.
    async fn close(&self);
}

/// [`DatabasePoolInterface`] over an sqlx `MySqlPool`.
pub struct DatabasePool {
    pool: MySqlPool,
}

impl DatabasePool {
    /// Opens a pool sized and timed from `config`.
    pub async fn new(config: &DatabaseConfig) -> GantryResult<Self> {
        info!(
            host = %redacted_host(&config.url),
            max_connections = config.max_connections,
            "Connecting to MySQL"
        );

        let pool = MySqlPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(Some(config.idle_timeout()))
            .connect(&config.url)
            .await
            .map_err(|e| {
                warn!(error = %e, "MySQL connection failed");
                GantryError::Database(format!("Failed to connect: {}", e))
            })?;

        Ok(Self { pool })
    }

    /// Wraps a pool opened elsewhere.
    #[must_use]
    pub fn with_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabasePoolInterface for DatabasePool {
    fn inner(&self) -> &MySqlPool {
        &self.pool
    }

    async fn health_check(&self) -> GantryResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| GantryError::Database(format!("Health check failed: {}", e)))
    }

    async fn run_migrations(&self) -> GantryResult<()> {
        debug!(migrations = MIGRATOR.iter().count(), "Applying migrations");
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| GantryError::Database(format!("Migration failed: {}", e)))?;
        info!("Database schema is up to date");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("MySQL pool closed");
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("size", &self.pool.size())
            .field("num_idle", &self.pool.num_idle())
            .finish()
    }
}

/// Opens the pool and, when `auto_migrate` is set, brings the schema up to date.
pub async fn create_pool(config: &DatabaseConfig) -> GantryResult<Arc<DatabasePool>> {
    let pool = DatabasePool::new(config).await?;
    if config.auto_migrate {
        pool.run_migrations().await?;
    }
    Ok(Arc::new(pool))
}

/// Host part of a connection URL, without credentials.
fn redacted_host(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let rest = rest.rsplit_once('@').map_or(rest, |(_, host)| host);
    rest.split('/').next().unwrap_or(rest)
}
