//! In-memory cache backend.

use super::CacheBackend;
use async_trait::async_trait;
use gantry_core::{GantryError, GantryResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Cache backend backed by a `HashMap` with per-entry expiry.
///
/// Expiry uses `tokio::time`, so paused-clock tests can advance past a TTL.
/// The backend can be switched into a failing mode, its writes can be slowed
/// down, and it can be inspected.
#[derive(Debug, Default)]
pub struct InMemoryCacheBackend {
    entries: Mutex<HashMap<String, (String, Instant)>>,
    fail_all: AtomicBool,
    write_latency: Mutex<Option<Duration>>,
    gets: AtomicUsize,
    sets: AtomicUsize,
    deletes: AtomicUsize,
}

impl InMemoryCacheBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with a `Cache` error.
    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Delays every subsequent `set_raw`, `delete` and `delete_prefix` call.
    pub fn set_write_latency(&self, latency: Option<Duration>) {
        *self.write_latency.lock() = latency;
    }

    /// Returns `true` if a live entry exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .lock()
            .get(key)
            .is_some_and(|(_, expires_at)| *expires_at > now)
    }

    /// Drops an entry without counting it as a delete, as if it had expired.
    pub fn evict(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    /// Returns the live keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .iter()
            .filter(|(_, (_, expires_at))| *expires_at > now)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Number of `get_raw` calls.
    #[must_use]
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `set_raw` calls.
    #[must_use]
    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    /// Number of `delete` and `delete_prefix` calls.
    #[must_use]
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn enter_read(&self) -> GantryResult<()> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check_available()
    }

    async fn enter_write(&self, counter: &AtomicUsize) -> GantryResult<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        let latency = *self.write_latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.check_available()
    }

    fn check_available(&self) -> GantryResult<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(GantryError::cache("cache backend unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for InMemoryCacheBackend {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn get_raw(&self, key: &str) -> GantryResult<Option<String>> {
        self.enter_read()?;
        let now = Instant::now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > now => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> GantryResult<()> {
        self.enter_write(&self.sets).await?;
        let expires_at = Instant::now() + ttl;
        self.entries
            .lock()
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn delete(&self, key: &str) -> GantryResult<bool> {
        self.enter_write(&self.deletes).await?;
        let now = Instant::now();
        Ok(self
            .entries
            .lock()
            .remove(key)
            .is_some_and(|(_, expires_at)| expires_at > now))
    }

    async fn delete_prefix(&self, prefix: &str) -> GantryResult<u64> {
        self.enter_write(&self.deletes).await?;
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }
}
