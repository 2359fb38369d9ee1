use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::deal::ErrorResponse;
use crate::services::deal_importer::DealError;
use crate::services::deal_store::StoreError;

/// Error type returned by the deal handlers
///
/// Rendered as `{ "error": ..., "code": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Deal(#[from] DealError),

    #[error("Storage failure: {0}")]
    Store(#[from] StoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Deal(DealError::Validation(failure)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                failure.message().to_string(),
            ),
            AppError::Deal(err @ DealError::Duplicate(_)) => {
                (StatusCode::CONFLICT, "DUPLICATE_DEAL", err.to_string())
            }
            AppError::Deal(DealError::Storage(err)) | AppError::Store(err) => {
                tracing::error!(error = %err, "Storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "An internal storage error occurred".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
