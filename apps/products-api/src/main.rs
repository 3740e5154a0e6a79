//! Products API - REST server for the product catalog

use axum_helpers::{cors_from_env, create_production_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{connect_from_config_with_retry, run_migrations};
use migration::Migrator;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        url = %config.database.redacted_url(),
        storage_root = %config.storage.root.display(),
        "Starting {} v{}",
        config.app.name,
        config.app.version
    );

    let db = connect_from_config_with_retry(config.database.clone(), None).await?;

    if config.run_migrations {
        run_migrations::<Migrator>(&db, config.app.name).await?;
    }

    let state = AppState::new(config, db);

    let cors = cors_from_env(&state.config.environment)?;
    let router = create_router::<openapi::ApiDoc>(api::routes(&state), cors)
        .merge(api::health::router(state.clone()));

    info!("Starting Products API on port {}", state.config.server.port);

    let db = state.db.clone();
    create_production_app(
        router,
        &state.config.server,
        state.config.server.shutdown_timeout,
        async move {
            info!("Shutting down: closing PostgreSQL pool");
            match db.close().await {
                Ok(()) => info!("PostgreSQL pool closed"),
                Err(e) => tracing::warn!(error = %e, "Failed to close PostgreSQL pool"),
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Products API shutdown complete");
    Ok(())
}
