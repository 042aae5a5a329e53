//! # Gantry Service
//!
//! Business logic for Gantry: the provider cache-aside layer, the
//! detached background task runner and the Pokemon pass-through.

pub mod background;
pub mod cache;
pub mod dto;
pub mod r#impl;
pub mod metrics;
pub mod pokemon_service;
pub mod provider_service;

pub use background::BackgroundTasks;
pub use cache::*;
pub use dto::*;
pub use pokemon_service::*;
pub use provider_service::*;
pub use r#impl::{PokemonServiceImpl, ProviderServiceImpl};
