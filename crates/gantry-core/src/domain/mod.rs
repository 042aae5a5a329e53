//! Domain entities for Gantry.

pub mod pokemon;
pub mod provider;

pub use pokemon::*;
pub use provider::*;
