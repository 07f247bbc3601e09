//! Path and query extractors whose rejections render as [`AppError`].
//!
//! axum's own `Path` and `Query` reject malformed input with a plain-text
//! 400. These wrappers keep the `{ "error", "code" }` envelope for those too.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use gpuwatch_core::error::CoreError;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// `Path` with a JSON `VALIDATION_ERROR` rejection.
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

/// `Query` with a JSON `VALIDATION_ERROR` rejection.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Core(CoreError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Core(CoreError::Validation(rejection.body_text()))
    }
}
