//! Pokemon service implementation.

use crate::pokemon_service::PokemonService;
use async_trait::async_trait;
use gantry_client::{PokeApiClient, PokemonPayload};
use gantry_core::{GantryError, GantryResult, Pokemon};
use std::sync::Arc;
use tracing::debug;

/// [`PokemonService`] over a [`PokeApiClient`].
pub struct PokemonServiceImpl {
    client: Arc<dyn PokeApiClient>,
}

impl PokemonServiceImpl {
    /// Creates a new pokemon service.
    pub fn new(client: Arc<dyn PokeApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PokemonService for PokemonServiceImpl {
    async fn get_pokemon(&self, name: &str) -> GantryResult<Pokemon> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(GantryError::validation("Pokemon name must not be empty"));
        }

        debug!("Getting pokemon: {}", name);
        let payload = self.client.get_pokemon(&name).await?;
        Ok(to_pokemon(payload))
    }
}

fn to_pokemon(payload: PokemonPayload) -> Pokemon {
    Pokemon {
        name: payload.name,
        height: payload.height,
        weight: payload.weight,
        abilities: payload
            .abilities
            .into_iter()
            .map(|slot| slot.ability.name)
            .collect(),
    }
}
