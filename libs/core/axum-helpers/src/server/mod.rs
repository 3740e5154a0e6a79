//! Server bootstrap: router assembly, health endpoints and graceful shutdown.
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router, AppInfo};
//!
//! let router = create_router::<ApiDoc>(api_routes, cors)
//!     .merge(health_router(AppInfo::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))));
//!
//! create_production_app(router, &config, Duration::from_secs(30), cleanup).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_production_app, create_router};
pub use health::{AppInfo, HealthCheckFuture, HealthResponse, health_router, run_health_checks};
pub use shutdown::ShutdownCoordinator;
