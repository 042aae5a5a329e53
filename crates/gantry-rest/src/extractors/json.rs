//! JSON body extractor with enveloped rejections.

use crate::responses::AppError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use gantry_core::GantryError;
use serde::de::DeserializeOwned;

/// Like [`axum::Json`], but a malformed body is answered with a 400 in the
/// standard [`ApiResponse`](crate::responses::ApiResponse) envelope.
///
/// Field validation is left to the service layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            AppError::new(GantryError::validation(rejection.body_text())).with_message("Invalid request body")
        })?;

        Ok(JsonBody(value))
    }
}
