use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::{info, instrument};

use super::PostgresConfig;
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry_with_backoff};

/// Open a pool using the settings in `config`.
///
/// ```ignore
/// use database::postgres::{connect_from_config, PostgresConfig};
///
/// let db = connect_from_config(PostgresConfig::new("postgresql://catalog@localhost/catalog")).await?;
/// ```
#[instrument(skip_all, fields(url = %config.redacted_url()))]
pub async fn connect_from_config(config: PostgresConfig) -> DatabaseResult<DatabaseConnection> {
    let db = Database::connect(config.into_connect_options()).await?;
    info!("Connected to PostgreSQL");
    Ok(db)
}

/// [`connect_from_config`] with exponential backoff.
///
/// Every failed attempt is retried until `retry_config` is exhausted, after
/// which the last failure is reported as [`DatabaseError::ConnectionFailed`].
pub async fn connect_from_config_with_retry(
    config: PostgresConfig,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<DatabaseConnection> {
    let retry_config = retry_config.unwrap_or_default();

    retry_with_backoff(|| connect_from_config(config.clone()), retry_config)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))
}

/// Apply every pending migration of `M`
///
/// ```ignore
/// database::postgres::run_migrations::<migration::Migrator>(&db, "products-api").await?;
/// ```
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> DatabaseResult<()> {
    info!(app = app_name, "Running database migrations");
    M::up(db, None)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
    info!(app = app_name, "Migrations applied");
    Ok(())
}
