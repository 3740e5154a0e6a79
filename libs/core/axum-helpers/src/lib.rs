//! # Axum Helpers
//!
//! Shared building blocks for the HTTP services in this workspace.
//!
//! - **[`errors`]**: [`AppError`] and the standard JSON error body
//! - **[`extractors`]**: [`UuidPath`]
//! - **[`http`]**: CORS policy and security headers
//! - **[`server`]**: router assembly, health/readiness, graceful shutdown

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::UuidPath;
pub use http::{cors_from_env, create_cors_layer, security_headers};
pub use server::{
    AppInfo, HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks,
};
