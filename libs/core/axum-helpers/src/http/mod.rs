//! Cross-cutting HTTP middleware: CORS policy and security headers.

pub mod cors;
pub mod security;

pub use cors::{cors_from_env, create_cors_layer};
pub use security::security_headers;
