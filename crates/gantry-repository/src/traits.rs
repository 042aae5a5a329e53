//! Repository trait definitions.

use gantry_core::{GantryResult, Interface, PageWindow, Provider, ProviderId};
use async_trait::async_trait;

/// Provider store. The source of truth for every provider.
///
/// Only live (not soft-deleted) providers are visible through this trait.
#[async_trait]
pub trait ProviderRepository: Interface + Send + Sync {
    /// Persists a new provider.
    ///
    /// Fails with `Conflict` when a live provider already holds the short name.
    async fn create(&self, provider: &Provider) -> GantryResult<()>;

    /// Replaces the mutable fields of a live provider.
    ///
    /// Returns `false` when no live provider has this id.
    async fn update(&self, provider: &Provider) -> GantryResult<bool>;

    /// Soft-deletes a provider.
    ///
    /// Returns `false` when no live provider has this id.
    async fn delete_by_id(&self, id: ProviderId) -> GantryResult<bool>;

    /// Finds a provider by ID.
    async fn find_by_id(&self, id: ProviderId) -> GantryResult<Option<Provider>>;

    /// Finds a provider by short name.
    async fn find_by_short_name(&self, short_name: &str) -> GantryResult<Option<Provider>>;

    /// Lists providers in creation order.
    async fn list(&self, window: PageWindow) -> GantryResult<Vec<Provider>>;

    /// Counts live providers.
    async fn count(&self) -> GantryResult<u64>;
}
