//! Client for the public Pokemon API (`pokeapi.co`).

use async_trait::async_trait;
use gantry_config::PokeApiConfig;
use gantry_core::{GantryError, GantryResult, Interface};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

const SERVICE_NAME: &str = "pokeapi";

/// Pokemon as returned by `GET /pokemon/{name}`, reduced to the fields we use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PokemonPayload {
    pub name: String,
    pub height: u32,
    pub weight: u32,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
}

/// One entry of the `abilities` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
}

/// A `{ "name": ..., "url": ... }` reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedResource {
    pub name: String,
}

/// Pokemon API client.
#[async_trait]
pub trait PokeApiClient: Interface + Send + Sync {
    /// Fetches a pokemon by name.
    ///
    /// Fails with `NotFound` on 404 and `ExternalService` on any other
    /// non-success status or transport error.
    async fn get_pokemon(&self, name: &str) -> GantryResult<PokemonPayload>;
}

/// reqwest-backed [`PokeApiClient`].
pub struct HttpPokeApiClient {
    client: Client,
    base_url: String,
}

impl HttpPokeApiClient {
    /// Creates a client from configuration.
    pub fn new(config: &PokeApiConfig) -> GantryResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GantryError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, &config.base_url))
    }

    /// Creates a client around an existing `reqwest::Client`.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl PokeApiClient for HttpPokeApiClient {
    async fn get_pokemon(&self, name: &str) -> GantryResult<PokemonPayload> {
        debug!("GET pokemon: {}", name);

        let response = self
            .client
            .get(self.url(&format!("/pokemon/{}", name)))
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| GantryError::external(SERVICE_NAME, format!("HTTP error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_http_error(status, name));
        }

        response
            .json()
            .await
            .map_err(|e| GantryError::external(SERVICE_NAME, format!("JSON parse error: {}", e)))
    }
}

impl std::fmt::Debug for HttpPokeApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPokeApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn map_http_error(status: StatusCode, name: &str) -> GantryError {
    if status == StatusCode::NOT_FOUND {
        GantryError::not_found("Pokemon", name)
    } else if status.is_client_error() {
        GantryError::external(SERVICE_NAME, format!("Client side error: {}", status))
    } else {
        GantryError::external(SERVICE_NAME, format!("Server side error: {}", status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_construction() {
        let client = HttpPokeApiClient::with_client(Client::new(), "https://pokeapi.co/api/v2/");
        assert_eq!(client.url("/pokemon/ditto"), "https://pokeapi.co/api/v2/pokemon/ditto");
    }

    #[test]
    fn test_map_http_error() {
        assert!(map_http_error(StatusCode::NOT_FOUND, "missingno").is_not_found());

        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, "ditto");
        assert!(matches!(err, GantryError::ExternalService { ref message, .. } if message.starts_with("Client side")));

        let err = map_http_error(StatusCode::BAD_GATEWAY, "ditto");
        assert!(matches!(err, GantryError::ExternalService { ref message, .. } if message.starts_with("Server side")));
    }
}
