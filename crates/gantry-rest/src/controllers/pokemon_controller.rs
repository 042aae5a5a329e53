//! Pokemon pass-through controller.

use crate::{
    responses::{ok, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use gantry_core::{ErrorResponse, Pokemon};
use tracing::debug;

/// Creates the pokemon router.
pub fn router() -> Router<AppState> {
    Router::new().route("/pokemon/:name", get(get_pokemon))
}

/// Get a pokemon by name from the public Pokemon API.
#[utoipa::path(
    get,
    path = "/v1/pokemon/{name}",
    tag = "pokemon",
    params(("name" = String, Path, description = "Pokemon name")),
    responses(
        (status = 200, description = "Pokemon found", body = Pokemon),
        (status = 404, description = "Pokemon not found", body = ErrorResponse),
        (status = 502, description = "Pokemon API failure", body = ErrorResponse)
    )
)]
pub async fn get_pokemon(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Pokemon> {
    debug!("Get pokemon request: {}", name);

    match state.pokemon_service.get_pokemon(&name).await {
        Ok(pokemon) => ok(pokemon),
        Err(e) if e.is_not_found() => {
            Err(AppError::new(e).with_message(format!("Pokemon named '{}' doesn't exist", name)))
        }
        Err(e) => Err(e.into()),
    }
}
