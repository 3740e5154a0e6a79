//! Configuration for Products API

use axum_helpers::AppInfo;
use core_config::{FromEnv, env_parse_or_default, server::ServerConfig};
use database::postgres::PostgresConfig;
use storage::StorageConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub storage: StorageConfig,
    /// Apply pending migrations before serving (`RUN_MIGRATIONS`, default true)
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: AppInfo::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            database: PostgresConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            run_migrations: env_parse_or_default("RUN_MIGRATIONS", "true")?,
        })
    }
}
