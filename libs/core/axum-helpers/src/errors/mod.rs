pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Error as UuidError;
use validator::ValidationErrors;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1004,
///   "error": "NOT_FOUND",
///   "message": "Product 0192e0a4-... not found"
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    pub message: String,
    /// Per-field validation errors, when there are any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error type every handler can return.
///
/// Domain errors convert into this with `From`, so the status code, the
/// error body and the log level are decided in one place.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("UUID error: {0}")]
    UuidError(#[from] UuidError),

    #[error("Invalid form: {0}")]
    InvalidForm(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::ValidationError(e) => {
                tracing::info!(
                    error_code = ErrorCode::ValidationError.code(),
                    "Validation error: {}",
                    e
                );
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::ValidationError,
                    ErrorCode::ValidationError.default_message().to_string(),
                    serde_json::to_value(&e).ok(),
                )
            }
            AppError::UuidError(e) => {
                tracing::info!(error_code = ErrorCode::InvalidUuid.code(), "UUID error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::InvalidUuid,
                    ErrorCode::InvalidUuid.default_message().to_string(),
                    None,
                )
            }
            AppError::InvalidForm(msg) => {
                tracing::info!(error_code = ErrorCode::InvalidForm.code(), "Invalid form: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidForm, msg, None)
            }
            AppError::PayloadTooLarge(msg) => {
                tracing::info!(
                    error_code = ErrorCode::PayloadTooLarge.code(),
                    "Payload too large: {}",
                    msg
                );
                (StatusCode::PAYLOAD_TOO_LARGE, ErrorCode::PayloadTooLarge, msg, None)
            }
            AppError::BadRequest(msg) => {
                tracing::info!(error_code = ErrorCode::BadRequest.code(), "Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorCode::BadRequest, msg, None)
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = ErrorCode::NotFound.code(), "Not found: {}", msg);
                (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg, None)
            }
            AppError::Database(e) => map_db_error(&e),
            AppError::Storage(msg) => {
                tracing::error!(error_code = ErrorCode::StorageError.code(), "Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::StorageError,
                    ErrorCode::StorageError.default_message().to_string(),
                    None,
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(
                    error_code = ErrorCode::InternalError.code(),
                    "Internal server error: {}",
                    msg
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    ErrorCode::InternalError.default_message().to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code.code(),
            error: code.as_str().to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Pool exhaustion is reported as 503 so clients retry; everything else is
/// a 500 with the driver message kept out of the body.
fn map_db_error(error: &DbErr) -> (StatusCode, ErrorCode, String, Option<serde_json::Value>) {
    let code = match error {
        DbErr::ConnectionAcquire(_) => ErrorCode::DatabaseUnavailable,
        _ => ErrorCode::DatabaseError,
    };
    tracing::error!(error_code = code.code(), "Database error: {:?}", error);

    let status = match code {
        ErrorCode::DatabaseUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, code, code.default_message().to_string(), None)
}

/// Build an error response without going through [`AppError`]
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    let body = Json(ErrorResponse {
        code: error_code.code(),
        error: error_code.as_str().to_string(),
        message,
        details: None,
    });

    (status, body).into_response()
}
