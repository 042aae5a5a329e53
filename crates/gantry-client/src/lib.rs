//! # Gantry Client
//!
//! HTTP clients for third-party APIs consumed by Gantry.

pub mod pokeapi;

pub use pokeapi::*;
