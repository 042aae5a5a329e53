//! Provider-related DTOs.

use chrono::{DateTime, Utc};
use gantry_core::rules::{empty_or_not_blank, not_blank, valid_short_name};
use gantry_core::{Provider, ProviderId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request to create a provider.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProviderRequest {
    #[validate(
        length(min = 1, max = 64, message = "Short name must be 1-64 characters"),
        custom(function = "valid_short_name")
    )]
    pub short_name: String,

    #[validate(
        length(min = 1, max = 255, message = "Long name must be 1-255 characters"),
        custom(function = "not_blank")
    )]
    pub long_name: String,
}

/// Request to update a provider. An empty field keeps its current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProviderRequest {
    #[validate(
        length(max = 64, message = "Short name must be at most 64 characters"),
        custom(function = "valid_short_name")
    )]
    pub short_name: String,

    #[validate(
        length(max = 255, message = "Long name must be at most 255 characters"),
        custom(function = "empty_or_not_blank")
    )]
    pub long_name: String,
}

impl UpdateProviderRequest {
    /// Returns `true` if neither field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.short_name.is_empty() && self.long_name.is_empty()
    }
}

/// Provider response DTO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    pub id: ProviderId,
    pub short_name: String,
    pub long_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Provider> for ProviderResponse {
    fn from(provider: Provider) -> Self {
        Self {
            id: provider.id,
            short_name: provider.short_name,
            long_name: provider.long_name,
            created_at: provider.created_at,
            updated_at: provider.updated_at,
        }
    }
}

/// One page of the provider listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderListResponse {
    pub providers: Vec<ProviderResponse>,
    pub offset: u64,
    pub limit: u64,
}
