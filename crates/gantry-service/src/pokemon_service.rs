//! Pokemon service trait definition.

use async_trait::async_trait;
use gantry_core::{GantryResult, Interface, Pokemon};

/// Pass-through lookups against the public Pokemon API.
#[async_trait]
pub trait PokemonService: Interface + Send + Sync {
    /// Gets a pokemon by name.
    async fn get_pokemon(&self, name: &str) -> GantryResult<Pokemon>;
}
