//! Provider service implementation.

use crate::background::BackgroundTasks;
use crate::cache::ProviderCache;
use crate::dto::{CreateProviderRequest, UpdateProviderRequest};
use crate::metrics;
use crate::provider_service::ProviderService;
use async_trait::async_trait;
use gantry_core::{GantryError, GantryResult, PageWindow, Provider, ProviderId, ValidateExt};
use gantry_repository::ProviderRepository;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Whether a provider read from the database is written back to the cache.
///
/// The target of a mutation is never written back: the mutation's own cache
/// task rewrites its entries and a write-back of the old value could land
/// after it. Other providers found along the way are refilled as usual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refill {
    Yes,
    No,
    Except(ProviderId),
}

impl Refill {
    fn applies_to(self, provider: &Provider) -> bool {
        match self {
            Self::Yes => true,
            Self::No => false,
            Self::Except(target) => provider.id != target,
        }
    }
}

/// Cache-aside [`ProviderService`].
pub struct ProviderServiceImpl {
    repository: Arc<dyn ProviderRepository>,
    cache: Arc<dyn ProviderCache>,
    tasks: BackgroundTasks,
}

impl ProviderServiceImpl {
    /// Creates a new provider service.
    pub fn new(repository: Arc<dyn ProviderRepository>, cache: Arc<dyn ProviderCache>, tasks: BackgroundTasks) -> Self {
        Self {
            repository,
            cache,
            tasks,
        }
    }

    /// Returns the tracker of detached cache tasks.
    #[must_use]
    pub fn tasks(&self) -> &BackgroundTasks {
        &self.tasks
    }

    async fn find_by_id(&self, id: ProviderId, refill: Refill) -> GantryResult<Option<Provider>> {
        if let Some(provider) = absorb("get_by_id", self.cache.get_by_id(id).await) {
            return Ok(Some(provider));
        }

        let provider = self.repository.find_by_id(id).await?;
        if let Some(provider) = provider.as_ref().filter(|p| refill.applies_to(p)) {
            self.refill(provider.clone());
        }
        Ok(provider)
    }

    async fn find_by_short_name(&self, short_name: &str, refill: Refill) -> GantryResult<Option<Provider>> {
        if let Some(provider) = absorb("get_by_short_name", self.cache.get_by_short_name(short_name).await) {
            return Ok(Some(provider));
        }

        let provider = self.repository.find_by_short_name(short_name).await?;
        if let Some(provider) = provider.as_ref().filter(|p| refill.applies_to(p)) {
            self.refill(provider.clone());
        }
        Ok(provider)
    }

    fn refill(&self, provider: Provider) {
        let cache = self.cache.clone();
        self.tasks
            .spawn("cache_refill", async move { cache.set_all(&provider).await });
    }

    fn invalidate(&self, provider: Provider) {
        let cache = self.cache.clone();
        self.tasks
            .spawn("cache_invalidate", async move { cache.invalidate(&provider).await });
    }
}

/// Turns a cache failure into a miss.
fn absorb<T>(operation: &'static str, result: GantryResult<Option<T>>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            metrics::cache_error(operation);
            warn!(operation, error = %e, "Cache lookup failed, falling back to database");
            None
        }
    }
}

fn short_name_taken(short_name: &str) -> GantryError {
    GantryError::conflict(format!("Provider with '{}' short name already exists", short_name))
}

#[async_trait]
impl ProviderService for ProviderServiceImpl {
    async fn create_provider(&self, request: CreateProviderRequest) -> GantryResult<Provider> {
        debug!("Creating provider: {}", request.short_name);

        request.validate_request()?;

        if self
            .find_by_short_name(&request.short_name, Refill::Yes)
            .await?
            .is_some()
        {
            return Err(short_name_taken(&request.short_name));
        }

        let provider = Provider::new(request.short_name, request.long_name);
        self.repository.create(&provider).await?;

        let cache = self.cache.clone();
        let created = provider.clone();
        self.tasks.spawn("cache_create", async move {
            let entries = cache.set_all(&created).await;
            let pages = cache.invalidate_paged().await;
            entries.and(pages)
        });

        info!("Provider created: {} ({})", provider.id, provider.short_name);
        Ok(provider)
    }

    async fn update_provider(&self, id: ProviderId, request: UpdateProviderRequest) -> GantryResult<Provider> {
        debug!("Updating provider: {}", id);

        request.validate_request()?;

        let conflicting = if request.short_name.is_empty() {
            None
        } else {
            self.find_by_short_name(&request.short_name, Refill::Except(id)).await?
        };

        let existing = self
            .find_by_id(id, Refill::No)
            .await?
            .ok_or_else(|| GantryError::not_found("Provider", id))?;

        if conflicting.is_some_and(|other| other.id != existing.id) {
            return Err(short_name_taken(&request.short_name));
        }

        let merged = existing.merged(&request.short_name, &request.long_name);
        if !self.repository.update(&merged).await? {
            // Deleted since it was read, possibly through a stale cache entry.
            self.invalidate(existing);
            return Err(GantryError::not_found("Provider", id));
        }

        let cache = self.cache.clone();
        let updated = merged.clone();
        self.tasks.spawn("cache_update", async move {
            let old = cache.invalidate(&existing).await;
            let new = cache.set_all(&updated).await;
            old.and(new)
        });

        info!("Provider updated: {}", id);
        Ok(merged)
    }

    async fn get_provider(&self, id: ProviderId) -> GantryResult<Provider> {
        debug!("Getting provider: {}", id);

        self.find_by_id(id, Refill::Yes)
            .await?
            .ok_or_else(|| GantryError::not_found("Provider", id))
    }

    async fn list_providers(&self, offset: i64, limit: i64) -> GantryResult<Vec<Provider>> {
        let window = PageWindow::new(offset, limit);
        debug!("Listing providers, offset: {}, limit: {}", window.offset(), window.limit());

        if let Some(page) = absorb("get_paged", self.cache.get_paged(window).await) {
            if window.is_filled_by(page.len()) {
                return Ok(page);
            }
            debug!("Ignoring short cached page ({} of {})", page.len(), window.limit());
        }

        let page = self.repository.list(window).await?;

        let cache = self.cache.clone();
        let fetched = page.clone();
        self.tasks
            .spawn("cache_set_paged", async move { cache.set_paged(window, &fetched).await });

        Ok(page)
    }

    async fn delete_provider(&self, id: ProviderId) -> GantryResult<()> {
        debug!("Deleting provider: {}", id);

        let existing = self
            .find_by_id(id, Refill::No)
            .await?
            .ok_or_else(|| GantryError::not_found("Provider", id))?;

        let deleted = self.repository.delete_by_id(id).await?;
        self.invalidate(existing);

        if !deleted {
            return Err(GantryError::not_found("Provider", id));
        }

        info!("Provider deleted: {}", id);
        Ok(())
    }
}
