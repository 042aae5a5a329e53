//! Envelope written around every `/v1` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gantry_core::{ErrorResponse, GantryError};
use serde::{Deserialize, Serialize};
use tracing::error;

/// `{"success": true, "data": ...}` or `{"success": false, "error": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: ErrorResponse) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Handler error. The status comes from [`GantryError::status_code`]; the
/// client-facing message can be overridden so store details stay internal.
#[derive(Debug)]
pub struct AppError {
    error: GantryError,
    message: Option<String>,
}

impl AppError {
    #[must_use]
    pub fn new(error: GantryError) -> Self {
        Self { error, message: None }
    }

    #[must_use]
    pub fn with_message(self, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }
}

impl From<GantryError> for AppError {
    fn from(err: GantryError) -> Self {
        Self::new(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.error, code = self.error.error_code(), "Request failed");
        }

        let body = ErrorResponse {
            message: self.message.unwrap_or_else(|| self.error.to_string()),
            ..ErrorResponse::from_error(&self.error)
        };
        (status, Json(ApiResponse::<()>::failure(body))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// 200 with `data` in the envelope.
pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// 201 with `data` in the envelope.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

/// 204, no body at all.
pub fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}
