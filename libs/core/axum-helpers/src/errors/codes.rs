//! Error codes carried in every error body.
//!
//! Each code has a client-facing identifier (`NOT_FOUND`), an integer for
//! logs and dashboards (`1004`) and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
//! assert_eq!(ErrorCode::ValidationError.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000s)
    /// One or more fields failed validation
    ValidationError,
    /// Path parameter is not a UUID
    InvalidUuid,
    /// Multipart or form body could not be decoded
    InvalidForm,
    NotFound,
    /// Request body exceeds the configured limit
    PayloadTooLarge,
    BadRequest,

    // Database errors (2000s)
    DatabaseError,
    /// No pooled connection became available in time
    DatabaseUnavailable,

    // Storage errors (3000s)
    /// Blob storage read, write or delete failed
    StorageError,

    // Server errors (5000s)
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidUuid => "INVALID_UUID",
            Self::InvalidForm => "INVALID_FORM",
            Self::NotFound => "NOT_FOUND",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::BadRequest => "BAD_REQUEST",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DatabaseUnavailable => "DATABASE_UNAVAILABLE",
            Self::StorageError => "STORAGE_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Integer code used in structured logs.
    ///
    /// - 1000-1999: client errors
    /// - 2000-2999: database errors
    /// - 3000-3999: storage errors
    /// - 5000-5999: server errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidUuid => 1002,
            Self::InvalidForm => 1003,
            Self::NotFound => 1004,
            Self::PayloadTooLarge => 1006,
            Self::BadRequest => 1007,

            Self::DatabaseError => 2001,
            Self::DatabaseUnavailable => 2002,

            Self::StorageError => 3001,

            Self::InternalError => 5001,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidUuid => "Invalid UUID format",
            Self::InvalidForm => "Malformed form data",
            Self::NotFound => "Resource not found",
            Self::PayloadTooLarge => "Request body is too large",
            Self::BadRequest => "Bad request",
            Self::DatabaseError => "Database error occurred",
            Self::DatabaseUnavailable => "Database is temporarily unavailable",
            Self::StorageError => "File storage error occurred",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
