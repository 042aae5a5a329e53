//! OpenAPI documentation configuration.

use crate::controllers::diagnostics_controller::HealthResponse;
use gantry_core::{ErrorResponse, Pokemon, ProviderId};
use gantry_service::{CreateProviderRequest, ProviderListResponse, ProviderResponse, UpdateProviderRequest};
use utoipa::OpenApi;

/// OpenAPI documentation for the Gantry API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gantry API",
        version = "1.0.0",
        description = "Provider registry and Pokemon pass-through",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(
        // Provider endpoints
        crate::controllers::provider_controller::create_provider,
        crate::controllers::provider_controller::get_provider,
        crate::controllers::provider_controller::update_provider,
        crate::controllers::provider_controller::delete_provider,
        crate::controllers::provider_controller::list_providers,
        // Pokemon endpoints
        crate::controllers::pokemon_controller::get_pokemon,
        // Diagnostics endpoints
        crate::controllers::diagnostics_controller::health_check,
        crate::controllers::diagnostics_controller::simulate_status,
        crate::controllers::diagnostics_controller::simulate_latency,
    ),
    components(
        schemas(
            ProviderId,
            ErrorResponse,
            Pokemon,
            HealthResponse,
            CreateProviderRequest,
            UpdateProviderRequest,
            ProviderResponse,
            ProviderListResponse,
        )
    ),
    tags(
        (name = "providers", description = "Provider management endpoints. A short name already held by a live provider is answered with 409 Conflict."),
        (name = "pokemon", description = "Pokemon API pass-through"),
        (name = "diagnostics", description = "Health and fault simulation endpoints")
    )
)]
pub struct ApiDoc;
