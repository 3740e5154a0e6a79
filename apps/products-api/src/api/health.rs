//! Health check endpoints

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::{HealthCheckFuture, health_router, run_health_checks};

use crate::state::AppState;

/// Readiness: PostgreSQL answers `SELECT 1` and the image store is reachable
async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let db_check: HealthCheckFuture<'_> = Box::pin(async {
        database::postgres::check_health(&state.db)
            .await
            .map_err(|e| e.to_string())
    });
    let storage_check: HealthCheckFuture<'_> =
        Box::pin(async { state.products.check_storage().await.map_err(|e| e.to_string()) });

    let checks = vec![("database", db_check), ("storage", storage_check)];
    run_health_checks(checks).await
}

/// `/health` (liveness) and `/ready` (readiness)
pub fn router(state: AppState) -> Router {
    let app = state.config.app;

    Router::new()
        .route("/ready", get(ready))
        .with_state(state)
        .merge(health_router(app))
}
