//! HTTP error mapping.
//!
//! Every failure leaves a handler as an [`AppError`] and is rendered as
//! `{ "error": ..., "code": ... }`. Not-found is a domain outcome and maps to
//! 404; store failures are logged and answered with a generic 500 so driver
//! detail never reaches the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gpuwatch_core::error::CoreError;
use gpuwatch_engine::GatewayError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Store error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Store(e) => AppError::Database(e),
            not_found @ GatewayError::NotFound { .. } => AppError::Core(not_found.into()),
        }
    }
}

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl AppError {
    /// HTTP status, machine-readable code, and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(CoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            }
            AppError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Core(CoreError::Internal(detail)) => {
                tracing::error!(error_kind = "transient", error = %detail, "Request failed");
                internal()
            }
            AppError::Database(e) => {
                tracing::error!(error_kind = "transient", error = %e, "Store query failed");
                internal()
            }
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}
