//! Router state.

use gantry_service::{PokemonService, ProviderService};
use std::sync::Arc;

/// Services the `/v1` handlers call into. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub provider_service: Arc<dyn ProviderService>,
    pub pokemon_service: Arc<dyn PokemonService>,
}

impl AppState {
    pub fn new(provider_service: Arc<dyn ProviderService>, pokemon_service: Arc<dyn PokemonService>) -> Self {
        Self {
            provider_service,
            pokemon_service,
        }
    }
}
