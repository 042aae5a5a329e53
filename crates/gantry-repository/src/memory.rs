//! In-memory provider repository.

use crate::traits::ProviderRepository;
use async_trait::async_trait;
use gantry_core::{GantryError, GantryResult, PageWindow, Provider, ProviderId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Slot {
    provider: Provider,
    deleted: bool,
}

/// Provider repository backed by a `Vec`, in insertion order.
///
/// Mirrors the MySQL adapter: soft delete, creation-order listing and a
/// unique short name among live rows. It can also be switched into a failing
/// mode and slowed down, and it counts writes.
#[derive(Debug, Default)]
pub struct InMemoryProviderRepository {
    slots: Mutex<Vec<Slot>>,
    failing: AtomicBool,
    latency: Mutex<Option<Duration>>,
    writes: AtomicUsize,
}

impl InMemoryProviderRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository seeded with live providers.
    #[must_use]
    pub fn with_providers(providers: Vec<Provider>) -> Self {
        let repo = Self::new();
        repo.slots.lock().extend(providers.into_iter().map(|provider| Slot {
            provider,
            deleted: false,
        }));
        repo
    }

    /// Makes every subsequent call fail with a `Database` error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delays every subsequent call.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Number of successful `create`, `update` and `delete_by_id` calls.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> GantryResult<()> {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(GantryError::Database("connection refused".to_string()));
        }
        Ok(())
    }

    fn live(&self) -> Vec<Provider> {
        self.slots
            .lock()
            .iter()
            .filter(|slot| !slot.deleted)
            .map(|slot| slot.provider.clone())
            .collect()
    }
}

#[async_trait]
impl ProviderRepository for InMemoryProviderRepository {
    async fn create(&self, provider: &Provider) -> GantryResult<()> {
        self.enter().await?;
        let mut slots = self.slots.lock();
        if slots.iter().any(|slot| slot.provider.id == provider.id) {
            return Err(GantryError::conflict(format!("Duplicate entry '{}' for key 'PRIMARY'", provider.id)));
        }
        if slots
            .iter()
            .any(|slot| !slot.deleted && slot.provider.short_name == provider.short_name)
        {
            return Err(GantryError::conflict(format!(
                "Duplicate entry '{}' for key 'uq_providers_live_short_name'",
                provider.short_name
            )));
        }
        slots.push(Slot {
            provider: provider.clone(),
            deleted: false,
        });
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update(&self, provider: &Provider) -> GantryResult<bool> {
        self.enter().await?;
        let mut slots = self.slots.lock();
        if slots.iter().any(|slot| {
            !slot.deleted && slot.provider.id != provider.id && slot.provider.short_name == provider.short_name
        }) {
            return Err(GantryError::conflict(format!(
                "Duplicate entry '{}' for key 'uq_providers_live_short_name'",
                provider.short_name
            )));
        }
        let Some(slot) = slots
            .iter_mut()
            .find(|slot| !slot.deleted && slot.provider.id == provider.id)
        else {
            return Ok(false);
        };
        slot.provider.short_name.clone_from(&provider.short_name);
        slot.provider.long_name.clone_from(&provider.long_name);
        slot.provider.updated_at = provider.updated_at;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn delete_by_id(&self, id: ProviderId) -> GantryResult<bool> {
        self.enter().await?;
        let mut slots = self.slots.lock();
        let Some(slot) = slots.iter_mut().find(|slot| !slot.deleted && slot.provider.id == id) else {
            return Ok(false);
        };
        slot.deleted = true;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn find_by_id(&self, id: ProviderId) -> GantryResult<Option<Provider>> {
        self.enter().await?;
        Ok(self.live().into_iter().find(|p| p.id == id))
    }

    async fn find_by_short_name(&self, short_name: &str) -> GantryResult<Option<Provider>> {
        self.enter().await?;
        Ok(self.live().into_iter().find(|p| p.short_name == short_name))
    }

    async fn list(&self, window: PageWindow) -> GantryResult<Vec<Provider>> {
        self.enter().await?;
        let skip = usize::try_from(window.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(window.limit()).unwrap_or(usize::MAX);
        Ok(self.live().into_iter().skip(skip).take(take).collect())
    }

    async fn count(&self) -> GantryResult<u64> {
        self.enter().await?;
        Ok(self.live().len() as u64)
    }
}
