use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dayplan_core::error::CoreError;
use dayplan_db::store::StoreError;

use crate::response::ApiResponse;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the `{ success: false, error }`
/// envelope. Messages are static; no structured codes reach the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `dayplan_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A persistence error from the todo store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The request body was not valid JSON for the expected shape.
    #[error(transparent)]
    Json(#[from] JsonRejection),

    /// The query string could not be parsed.
    #[error(transparent)]
    Query(#[from] QueryRejection),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Message returned for every failure the client cannot act on.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, .. } => {
                    (StatusCode::NOT_FOUND, format!("{entity} not found"))
                }
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            },

            // --- Store errors ---
            AppError::Store(StoreError::UnknownCursor(_)) => {
                (StatusCode::BAD_REQUEST, "Invalid cursor".to_string())
            }
            AppError::Store(StoreError::Database(err)) => {
                tracing::error!(error = %err, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }

            // --- Extractor rejections ---
            AppError::Json(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            AppError::Query(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        (status, axum::Json(ApiResponse::<()>::failure(message))).into_response()
    }
}
