use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use storage::StorageError;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Product not found: {0}")]
    NotFound(Uuid),

    /// The row exists but its image blob is gone
    #[error("Image {image} of product {id} not found")]
    ImageNotFound { id: Uuid, image: String },

    #[error("Invalid form: {0}")]
    InvalidForm(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(errors) => AppError::ValidationError(errors),
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::ImageNotFound { id, image } => {
                AppError::NotFound(format!("Image {} of product {} not found", image, id))
            }
            ProductError::InvalidForm(msg) => AppError::InvalidForm(msg),
            ProductError::PayloadTooLarge(msg) => AppError::PayloadTooLarge(msg),
            ProductError::Storage(e) => AppError::Storage(e.to_string()),
            ProductError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
