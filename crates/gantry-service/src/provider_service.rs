//! Provider service trait definition.

use crate::dto::{CreateProviderRequest, UpdateProviderRequest};
use async_trait::async_trait;
use gantry_core::{GantryResult, Interface, Provider, ProviderId};

/// Provider service trait.
///
/// Reads go to the cache first and fall back to the database. Every
/// successful database read or write schedules a detached cache update.
/// Cache failures never reach the caller.
#[async_trait]
pub trait ProviderService: Interface + Send + Sync {
    /// Creates a provider. Fails with `Conflict` if a live provider already
    /// holds the short name.
    async fn create_provider(&self, request: CreateProviderRequest) -> GantryResult<Provider>;

    /// Updates a provider, keeping the current value of every empty field.
    async fn update_provider(&self, id: ProviderId, request: UpdateProviderRequest) -> GantryResult<Provider>;

    /// Gets a provider by ID.
    async fn get_provider(&self, id: ProviderId) -> GantryResult<Provider>;

    /// Lists providers in creation order. Offset and limit are normalized.
    async fn list_providers(&self, offset: i64, limit: i64) -> GantryResult<Vec<Provider>>;

    /// Deletes a provider.
    async fn delete_provider(&self, id: ProviderId) -> GantryResult<()>;
}
