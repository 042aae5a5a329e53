//! Provider keying policy on top of a [`CacheBackend`].

use super::{cache_keys, CacheBackend, CacheExt};
use crate::metrics;
use async_trait::async_trait;
use gantry_config::CacheConfig;
use gantry_core::{GantryResult, Interface, PageWindow, Provider, ProviderId};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Provider cache.
///
/// Three kinds of entry are kept: the primary entry (id to provider), the
/// short-name indirection (short name to id) and paged listings (window to
/// ordered ids). Lookups return `Ok(None)` on any clean miss; errors only come
/// from the backend.
#[async_trait]
pub trait ProviderCache: Interface + Send + Sync {
    /// Looks up the primary entry.
    async fn get_by_id(&self, id: ProviderId) -> GantryResult<Option<Provider>>;

    /// Writes the primary entry with the entity TTL.
    async fn set_by_id(&self, provider: &Provider) -> GantryResult<()>;

    /// Resolves the short-name indirection, then the primary entry.
    async fn get_by_short_name(&self, short_name: &str) -> GantryResult<Option<Provider>>;

    /// Writes the short-name indirection with the entity TTL.
    async fn set_by_short_name(&self, short_name: &str, id: ProviderId) -> GantryResult<()>;

    /// Writes the primary entry, then the indirection.
    async fn set_all(&self, provider: &Provider) -> GantryResult<()>;

    /// Looks up a paged listing and resolves every id in it.
    ///
    /// Returns `None` if the listing or any of its providers is missing.
    async fn get_paged(&self, window: PageWindow) -> GantryResult<Option<Vec<Provider>>>;

    /// Writes the primary entry of every provider, then the listing.
    async fn set_paged(&self, window: PageWindow, providers: &[Provider]) -> GantryResult<()>;

    /// Deletes the primary entry, the indirection and every paged listing.
    async fn invalidate(&self, provider: &Provider) -> GantryResult<()>;

    /// Deletes every paged listing.
    async fn invalidate_paged(&self) -> GantryResult<()>;
}

/// [`ProviderCache`] over any [`CacheBackend`].
pub struct ProviderCacheImpl {
    backend: Arc<dyn CacheBackend>,
    entity_ttl: Duration,
    listing_ttl: Duration,
}

impl ProviderCacheImpl {
    /// Creates a provider cache with the configured TTLs.
    #[must_use]
    pub fn new(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        Self {
            backend,
            entity_ttl: config.entity_ttl(),
            listing_ttl: config.listing_ttl(),
        }
    }
}

#[async_trait]
impl ProviderCache for ProviderCacheImpl {
    async fn get_by_id(&self, id: ProviderId) -> GantryResult<Option<Provider>> {
        let provider: Option<Provider> = self.backend.get(&cache_keys::provider_by_id(id)).await?;
        metrics::cache_lookup("id", provider.is_some());
        Ok(provider)
    }

    async fn set_by_id(&self, provider: &Provider) -> GantryResult<()> {
        self.backend
            .set(&cache_keys::provider_by_id(provider.id), provider, self.entity_ttl)
            .await
    }

    async fn get_by_short_name(&self, short_name: &str) -> GantryResult<Option<Provider>> {
        let id: Option<ProviderId> = self
            .backend
            .get(&cache_keys::provider_by_short_name(short_name))
            .await?;

        let Some(id) = id else {
            metrics::cache_lookup("short_name", false);
            return Ok(None);
        };

        // The indirection may outlive its primary entry or survive a rename.
        let provider = self
            .get_by_id(id)
            .await?
            .filter(|provider| provider.short_name == short_name);

        if provider.is_none() {
            debug!("Stale short name pointer: {} -> {}", short_name, id);
        }
        metrics::cache_lookup("short_name", provider.is_some());
        Ok(provider)
    }

    async fn set_by_short_name(&self, short_name: &str, id: ProviderId) -> GantryResult<()> {
        self.backend
            .set(&cache_keys::provider_by_short_name(short_name), &id, self.entity_ttl)
            .await
    }

    async fn set_all(&self, provider: &Provider) -> GantryResult<()> {
        self.set_by_id(provider).await?;
        self.set_by_short_name(&provider.short_name, provider.id).await
    }

    async fn get_paged(&self, window: PageWindow) -> GantryResult<Option<Vec<Provider>>> {
        let ids: Option<Vec<ProviderId>> = self.backend.get(&cache_keys::provider_page(window)).await?;

        let Some(ids) = ids else {
            metrics::cache_lookup("paged", false);
            return Ok(None);
        };

        let mut providers = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_by_id(id).await? {
                Some(provider) => providers.push(provider),
                None => {
                    debug!("Paged listing {:?} references uncached provider {}", window, id);
                    metrics::cache_lookup("paged", false);
                    return Ok(None);
                }
            }
        }

        metrics::cache_lookup("paged", true);
        Ok(Some(providers))
    }

    async fn set_paged(&self, window: PageWindow, providers: &[Provider]) -> GantryResult<()> {
        for provider in providers {
            self.set_by_id(provider).await?;
        }

        let ids: Vec<ProviderId> = providers.iter().map(|p| p.id).collect();
        self.backend
            .set(&cache_keys::provider_page(window), &ids, self.listing_ttl)
            .await
    }

    async fn invalidate(&self, provider: &Provider) -> GantryResult<()> {
        let by_id = self.backend.delete(&cache_keys::provider_by_id(provider.id)).await;
        let by_short_name = self
            .backend
            .delete(&cache_keys::provider_by_short_name(&provider.short_name))
            .await;
        let pages = self.invalidate_paged().await;

        by_id?;
        by_short_name?;
        pages
    }

    async fn invalidate_paged(&self) -> GantryResult<()> {
        let deleted = self
            .backend
            .delete_prefix(&cache_keys::provider_pages_prefix())
            .await?;
        debug!("Invalidated {} paged listings", deleted);
        Ok(())
    }
}
