//! HTTP controllers.

pub mod diagnostics_controller;
pub mod pokemon_controller;
pub mod provider_controller;
