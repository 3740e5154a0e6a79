//! Products Domain
//!
//! A product catalog where every product carries one image. Images are stored
//! in a [`storage::BlobStorage`] under the hex SHA-256 of their bytes; rows
//! live in PostgreSQL (or in memory for tests).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, multipart parsing
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, image storage
//! └──┬───────┬──┘
//!    │       │
//! ┌──▼───┐ ┌─▼───────────┐
//! │ Blob │ │ Repository  │  ← trait + PostgreSQL / in-memory
//! └──────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{handlers, PgProductRepository, ProductService};
//! use sea_orm::Database;
//! use storage::LocalBlobStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://localhost/catalog").await?;
//!
//! let service = ProductService::new(
//!     PgProductRepository::new(db),
//!     LocalBlobStorage::new("./storage/app"),
//! );
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod image;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod validation;

pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{
    ImageUpload, NewProduct, PER_PAGE, PageQuery, Product, ProductChanges, ProductFields,
    ProductForm, ProductPage,
};
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
