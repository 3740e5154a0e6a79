//! UUID path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

/// Parses the single path parameter as a UUID.
///
/// A malformed value is rejected with a 400 `INVALID_UUID` body instead of
/// axum's plain-text rejection.
///
/// ```ignore
/// async fn show(UuidPath(id): UuidPath) -> String {
///     format!("Product {id}")
/// }
///
/// let app = Router::new().route("/products/{id}", get(show));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        Ok(UuidPath(Uuid::parse_str(&raw)?))
    }
}
