use axum::http::{HeaderValue, Method, header};
use core_config::{ConfigError, Environment};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// CORS layer for the given comma-separated origin list
pub fn create_cors_layer(origins: &str) -> Result<CorsLayer, ConfigError> {
    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(HeaderValue::from_str)
        .collect::<Result<_, _>>()
        .map_err(|e| ConfigError::ParseError {
            key: "CORS_ALLOWED_ORIGIN".to_string(),
            details: e.to_string(),
        })?;

    if allowed.is_empty() {
        return Err(ConfigError::ParseError {
            key: "CORS_ALLOWED_ORIGIN".to_string(),
            details: "no origins given".to_string(),
        });
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::LOCATION])
        .max_age(Duration::from_secs(3600)))
}

/// CORS policy from `CORS_ALLOWED_ORIGIN`.
///
/// When unset, development allows any origin and production allows none.
pub fn cors_from_env(environment: &Environment) -> Result<CorsLayer, ConfigError> {
    match std::env::var("CORS_ALLOWED_ORIGIN") {
        Ok(origins) => create_cors_layer(&origins),
        Err(_) if environment.is_development() => Ok(CorsLayer::permissive()),
        Err(_) => Ok(CorsLayer::new()),
    }
}
