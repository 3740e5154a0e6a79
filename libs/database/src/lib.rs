//! Database plumbing shared by the services in this workspace
//!
//! # Features
//!
//! - `postgres` (default): SeaORM pool setup, migrations and health checks
//! - `config`: `core_config::FromEnv` for [`postgres::PostgresConfig`]
//!
//! ```ignore
//! use database::postgres;
//!
//! let db = postgres::connect_from_config_with_retry(config, None).await?;
//! postgres::run_migrations::<migration::Migrator>(&db, "products-api").await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
