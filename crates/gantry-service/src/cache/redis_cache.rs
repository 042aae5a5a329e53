//! Redis-based cache backend.

use super::CacheBackend;
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Pool, PoolConfig, Runtime, Timeouts};
use gantry_config::RedisConfig;
use gantry_core::{GantryError, GantryResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Keys fetched per `SCAN` round-trip during prefix deletion.
const SCAN_BATCH: usize = 100;

/// Redis-based cache backend.
///
/// Every key is stored as `{namespace}:{key}`. Without a pool the backend is a
/// no-op: reads miss and writes succeed. Each pool checkout and each
/// round-trip is bounded by `timeout`; running out of it is a cache error.
pub struct RedisCacheBackend {
    pool: Option<Arc<Pool>>,
    namespace: String,
    timeout: Duration,
}

impl RedisCacheBackend {
    /// Wraps an existing pool, bounding calls with the default `redis.timeout_ms`.
    #[must_use]
    pub fn new(pool: Arc<Pool>, namespace: impl Into<String>) -> Self {
        Self {
            pool: Some(pool),
            namespace: namespace.into(),
            timeout: RedisConfig::default().timeout(),
        }
    }

    /// Builds a pool from `config`. No connection is opened until first use.
    pub fn connect(config: &RedisConfig) -> GantryResult<Self> {
        let timeout = config.timeout();
        let mut pool_config = PoolConfig::new(config.pool_size as usize);
        pool_config.timeouts = Timeouts {
            wait: Some(timeout),
            create: Some(timeout),
            recycle: Some(timeout),
        };

        let mut redis_config = deadpool_redis::Config::from_url(&config.url);
        redis_config.pool = Some(pool_config);
        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| GantryError::cache(format!("Failed to create Redis pool: {}", e)))?;

        Ok(Self::new(Arc::new(pool), config.namespace.clone()).with_timeout(timeout))
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Creates a no-op backend (for when Redis is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            pool: None,
            namespace: String::new(),
            timeout: Duration::ZERO,
        }
    }

    /// Checks connectivity with `PING`.
    pub async fn ping(&self) -> GantryResult<()> {
        let mut conn = self.get_conn().await?;
        let _: String = self
            .bounded("PING", deadpool_redis::redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }

    fn namespaced(&self, key: &str) -> String {
        namespaced_key(&self.namespace, key)
    }

    async fn get_conn(&self) -> GantryResult<deadpool_redis::Connection> {
        let Some(pool) = &self.pool else {
            return Err(GantryError::cache("Cache is disabled"));
        };
        match tokio::time::timeout(self.timeout, pool.get()).await {
            Ok(conn) => conn.map_err(|e| GantryError::cache(format!("Failed to get Redis connection: {}", e))),
            Err(_) => Err(GantryError::cache(format!(
                "No Redis connection within {}ms",
                self.timeout.as_millis()
            ))),
        }
    }

    /// Runs one round-trip under the configured timeout.
    async fn bounded<T, F>(&self, command: &str, fut: F) -> GantryResult<T>
    where
        F: Future<Output = deadpool_redis::redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| GantryError::cache(format!("Redis {} failed: {}", command, e))),
            Err(_) => Err(GantryError::cache(format!(
                "Redis {} timed out after {}ms",
                command,
                self.timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_raw(&self, key: &str) -> GantryResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let key = self.namespaced(key);
        let mut conn = self.get_conn().await?;
        let value: Option<String> = self.bounded("GET", conn.get(&key)).await?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> GantryResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let key = self.namespaced(key);
        let mut conn = self.get_conn().await?;
        let ttl_secs = ttl.as_secs().max(1);

        self.bounded("SET", conn.set_ex::<_, _, ()>(&key, value, ttl_secs))
            .await?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }

    async fn delete(&self, key: &str) -> GantryResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let key = self.namespaced(key);
        let mut conn = self.get_conn().await?;
        let deleted: i64 = self.bounded("DEL", conn.del(&key)).await?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }

    async fn delete_prefix(&self, prefix: &str) -> GantryResult<u64> {
        if !self.is_enabled() {
            return Ok(0);
        }

        let pattern = format!("{}*", escape_glob(&self.namespaced(prefix)));
        let mut conn = self.get_conn().await?;
        let mut cursor: u64 = 0;
        let mut total: u64 = 0;

        loop {
            let mut scan = deadpool_redis::redis::cmd("SCAN");
            scan.arg(cursor).arg("MATCH").arg(&pattern).arg("COUNT").arg(SCAN_BATCH);
            let (next, keys): (u64, Vec<String>) = self.bounded("SCAN", scan.query_async(&mut conn)).await?;

            if !keys.is_empty() {
                let deleted: i64 = self.bounded("DEL", conn.del(&keys)).await?;
                total += deleted.unsigned_abs();
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!("Deleted {} keys matching pattern '{}'", total, pattern);
        Ok(total)
    }
}

fn namespaced_key(namespace: &str, key: &str) -> String {
    if namespace.is_empty() {
        key.to_string()
    } else {
        format!("{}:{}", namespace, key)
    }
}

/// Escapes Redis glob metacharacters so `value` matches literally.
fn escape_glob(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
