//! Error type shared by every Gantry crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every failure a Gantry operation can report.
///
/// The provider service only ever returns `NotFound`, `Conflict`,
/// `Validation` and `Database`. `Cache` failures are absorbed below it and
/// show up in logs and metrics only.
#[derive(Error, Debug)]
pub enum GantryError {
    #[error("{resource_type} '{id}' not found")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Request rejected before reaching any store.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A live provider already holds the short name.
    #[error("{0}")]
    Conflict(String),

    /// Store failure other than a missing row. Always propagated.
    #[error("store failure: {0}")]
    Database(String),

    /// Cache backend failure. Treated as a miss by readers.
    #[error("cache backend: {0}")]
    Cache(String),

    /// Upstream HTTP API failure.
    #[error("{service} request failed: {message}")]
    ExternalService { service: String, message: String },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("internal: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GantryError {
    /// HTTP status a handler answers with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict(_) => 409,
            Self::ExternalService { .. } => 502,
            Self::Database(_) | Self::Cache(_) | Self::Configuration(_) | Self::Internal(_) | Self::Other(_) => 500,
        }
    }

    /// Stable code placed in [`ErrorResponse::code`].
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    #[must_use]
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    #[must_use]
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    #[must_use]
    pub fn external(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether callers degrade around this failure instead of returning it.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Cache(_))
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for GantryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::not_found("row", "?"),
            sqlx::Error::Database(db_err) => {
                // MySQL reports SQLSTATE 23000 with server error 1062
                if db_err.is_unique_violation() {
                    return Self::Conflict(db_err.message().to_string());
                }
                Self::Database(err.to_string())
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for GantryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("json: {}", err))
    }
}

/// Error body carried in the `error` field of the response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    /// One of the [`GantryError::error_code`] values.
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    /// Code and display text of `error`.
    #[must_use]
    pub fn from_error(error: &GantryError) -> Self {
        Self {
            code: error.error_code().to_owned(),
            message: error.to_string(),
        }
    }
}

impl From<&GantryError> for ErrorResponse {
    fn from(error: &GantryError) -> Self {
        Self::from_error(error)
    }
}
