//! Caching infrastructure for the service layer.
//!
//! [`CacheBackend`] is the raw key-value seam with a Redis implementation and
//! an in-memory one. [`ProviderCache`] holds the provider keying policy on top
//! of it.

mod cache_backend;
pub mod cache_keys;
mod memory_cache;
mod provider_cache;
mod redis_cache;

pub use cache_backend::{CacheBackend, CacheExt};
pub use memory_cache::InMemoryCacheBackend;
pub use provider_cache::{ProviderCache, ProviderCacheImpl};
pub use redis_cache::RedisCacheBackend;
