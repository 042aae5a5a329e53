//! Service implementations.
//!
//! Trait definitions live in the parent module (e.g. `provider_service.rs`).

pub mod pokemon_service_impl;
pub mod provider_service_impl;

pub use pokemon_service_impl::PokemonServiceImpl;
pub use provider_service_impl::ProviderServiceImpl;
