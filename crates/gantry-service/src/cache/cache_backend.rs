//! Cache backend trait for raw key-value operations.

use async_trait::async_trait;
use gantry_core::{GantryError, GantryResult, Interface};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Key-value store used as an accelerator in front of the database.
///
/// Values are JSON strings so the trait stays dyn-compatible. Every failure is
/// reported as [`GantryError::Cache`].
#[async_trait]
pub trait CacheBackend: Interface + Send + Sync {
    /// Gets a raw value. Returns `None` if the key doesn't exist or has expired.
    async fn get_raw(&self, key: &str) -> GantryResult<Option<String>>;

    /// Sets a raw value with a TTL, replacing any previous value.
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> GantryResult<()>;

    /// Deletes a key. Returns `true` if the key existed.
    async fn delete(&self, key: &str) -> GantryResult<bool>;

    /// Deletes every key starting with `prefix`. Returns the number deleted.
    async fn delete_prefix(&self, prefix: &str) -> GantryResult<u64>;

    /// Returns `false` for a no-op backend.
    fn is_enabled(&self) -> bool;
}

/// Typed JSON helpers over [`CacheBackend`].
#[async_trait]
pub trait CacheExt: CacheBackend {
    /// Gets a typed value. An undecodable value is a cache error.
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> GantryResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| GantryError::cache(format!("Failed to decode key '{}': {}", key, e))),
            None => Ok(None),
        }
    }

    /// Sets a typed value.
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> GantryResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| GantryError::cache(format!("Failed to encode key '{}': {}", key, e)))?;
        self.set_raw(key, &json, ttl).await
    }
}

impl<T: CacheBackend + ?Sized> CacheExt for T {}
