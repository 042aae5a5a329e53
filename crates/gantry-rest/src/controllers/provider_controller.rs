//! Provider management controller.

use crate::{
    extractors::{JsonBody, PaginationQuery},
    responses::{created, no_content, ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use gantry_core::{ErrorResponse, GantryError, PageWindow, ProviderId};
use gantry_service::{CreateProviderRequest, ProviderListResponse, ProviderResponse, UpdateProviderRequest};
use tracing::debug;

/// Creates the provider router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/provider", post(create_provider))
        .route(
            "/provider/:id",
            get(get_provider).put(update_provider).delete(delete_provider),
        )
        .route("/providers", get(list_providers))
}

/// Create a provider.
#[utoipa::path(
    post,
    path = "/v1/provider",
    tag = "providers",
    request_body = CreateProviderRequest,
    responses(
        (status = 201, description = "Provider created", body = ProviderResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 409, description = "Short name already taken", body = ErrorResponse)
    )
)]
pub async fn create_provider(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateProviderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProviderResponse>>), AppError> {
    debug!("Create provider request: {}", request.short_name);

    let provider = state.provider_service.create_provider(request).await?;
    Ok(created(ProviderResponse::from(provider)))
}

/// Get a provider by ID.
#[utoipa::path(
    get,
    path = "/v1/provider/{id}",
    tag = "providers",
    params(("id" = String, Path, description = "Provider ID")),
    responses(
        (status = 200, description = "Provider found", body = ProviderResponse),
        (status = 404, description = "Provider not found", body = ErrorResponse)
    )
)]
pub async fn get_provider(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ProviderResponse> {
    debug!("Get provider request: {}", id);

    let provider_id = parse_provider_id(&id)?;
    let provider = state.provider_service.get_provider(provider_id).await?;
    ok(ProviderResponse::from(provider))
}

/// Update a provider. Empty fields keep their current value.
#[utoipa::path(
    put,
    path = "/v1/provider/{id}",
    tag = "providers",
    params(("id" = String, Path, description = "Provider ID")),
    request_body = UpdateProviderRequest,
    responses(
        (status = 200, description = "Provider updated", body = ProviderResponse),
        (status = 400, description = "Empty payload or invalid body", body = ErrorResponse),
        (status = 404, description = "Provider not found", body = ErrorResponse),
        (status = 409, description = "Short name already taken", body = ErrorResponse)
    )
)]
pub async fn update_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateProviderRequest>,
) -> ApiResult<ProviderResponse> {
    debug!("Update provider request: {}", id);

    let provider_id = parse_provider_id(&id)?;
    if request.is_empty() {
        return Err(GantryError::validation("Empty payload").into());
    }

    let provider = state.provider_service.update_provider(provider_id, request).await?;
    ok(ProviderResponse::from(provider))
}

/// Delete a provider.
#[utoipa::path(
    delete,
    path = "/v1/provider/{id}",
    tag = "providers",
    params(("id" = String, Path, description = "Provider ID")),
    responses(
        (status = 204, description = "Provider deleted"),
        (status = 404, description = "Provider not found", body = ErrorResponse)
    )
)]
pub async fn delete_provider(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, AppError> {
    debug!("Delete provider request: {}", id);

    let provider_id = parse_provider_id(&id)?;
    state.provider_service.delete_provider(provider_id).await?;

    Ok(no_content())
}

/// List providers in creation order.
#[utoipa::path(
    get,
    path = "/v1/providers",
    tag = "providers",
    params(PaginationQuery),
    responses(
        (status = 200, description = "One page of providers", body = ProviderListResponse),
        (status = 400, description = "Invalid query parameter", body = ErrorResponse)
    )
)]
pub async fn list_providers(State(state): State<AppState>, pagination: PaginationQuery) -> ApiResult<ProviderListResponse> {
    debug!("List providers request: {:?}", pagination);

    let window = PageWindow::from(pagination);
    let providers = state
        .provider_service
        .list_providers(pagination.offset(), pagination.limit())
        .await?;

    ok(ProviderListResponse {
        providers: providers.into_iter().map(ProviderResponse::from).collect(),
        offset: window.offset(),
        limit: window.limit(),
    })
}

/// Helper to parse provider ID from path parameter.
fn parse_provider_id(id: &str) -> Result<ProviderId, AppError> {
    ProviderId::parse(id).map_err(|_| {
        AppError::new(GantryError::validation(format!("Invalid provider ID: {}", id)))
            .with_message("Invalid 'id' path parameter")
    })
}
