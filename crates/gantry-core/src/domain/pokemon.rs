//! Pokemon entity returned by the pass-through API.

use serde::{Deserialize, Serialize};

/// A pokemon as exposed by the `/v1/pokemon/{name}` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Pokemon {
    pub name: String,
    pub height: u32,
    pub weight: u32,
    /// Ability names, in the order the upstream API lists them.
    pub abilities: Vec<String>,
}
