//! Pagination extractor.

use crate::responses::AppError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use gantry_core::{GantryError, PageWindow};
use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters for offset/limit pagination.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Number of providers to skip. Defaults to 0.
    #[serde(default)]
    pub offset: Option<i64>,
    /// Page size. Defaults to 20.
    #[serde(default)]
    pub limit: Option<i64>,
}

impl PaginationQuery {
    /// Requested offset, defaulted but not yet normalized.
    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }

    /// Requested limit, defaulted but not yet normalized.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or_else(|| i64::try_from(PageWindow::DEFAULT_LIMIT).unwrap_or(i64::MAX))
    }
}

impl From<PaginationQuery> for PageWindow {
    fn from(query: PaginationQuery) -> Self {
        PageWindow::new(query.offset(), query.limit())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PaginationQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PaginationQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError::new(GantryError::validation(rejection.body_text()))
                    .with_message("Invalid 'offset' or 'limit' query parameter")
            })?;
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let window = PageWindow::from(PaginationQuery::default());
        assert_eq!(window.offset(), 0);
        assert_eq!(window.limit(), 20);
    }

    #[test]
    fn test_out_of_range_values_are_normalized() {
        let window = PageWindow::from(PaginationQuery {
            offset: Some(-10),
            limit: Some(0),
        });
        assert_eq!((window.offset(), window.limit()), (0, 1));
    }
}
