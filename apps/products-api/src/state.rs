//! Application state management

use database::postgres::DatabaseConnection;
use domain_products::{PgProductRepository, ProductService};
use storage::LocalBlobStorage;

pub type Products = ProductService<PgProductRepository, LocalBlobStorage>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: DatabaseConnection,
    pub products: Products,
}

impl AppState {
    pub fn new(config: crate::config::Config, db: DatabaseConnection) -> Self {
        let products = ProductService::new(
            PgProductRepository::new(db.clone()),
            LocalBlobStorage::from_config(&config.storage),
        );

        Self {
            config,
            db,
            products,
        }
    }
}
