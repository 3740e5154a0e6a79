//! API routes module

pub mod health;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Routes served below `/api`
pub fn routes(state: &AppState) -> Router {
    Router::new().nest(domain_products::handlers::MOUNT_PATH, products::router(state))
}
