//! Environment-driven configuration shared by the workspace crates.
//!
//! Every config struct implements [`FromEnv`]; required keys fail with
//! [`ConfigError::MissingEnvVar`], malformed values with
//! [`ConfigError::ParseError`].

pub mod server;
pub mod tracing;

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Application environment, selected by `APP_ENV`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env_or_default("APP_ENV", "development");

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Read an environment variable, falling back to `default` when unset
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an environment variable or fail with [`ConfigError::MissingEnvVar`]
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Read and parse an environment variable, falling back to `default` when unset.
///
/// The default is parsed too, so a bad default surfaces the same way a bad
/// value would.
pub fn env_parse_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_or_default(key, default)
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        for value in ["production", "PRODUCTION", "Production"] {
            temp_env::with_var("APP_ENV", Some(value), || {
                assert_eq!(Environment::from_env(), Environment::Production);
            });
        }
    }

    #[test]
    fn test_environment_unknown_defaults_to_development() {
        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("CATALOG_MISSING_REQUIRED", || {
            let err = env_required("CATALOG_MISSING_REQUIRED").unwrap_err();
            assert!(err.to_string().contains("CATALOG_MISSING_REQUIRED"));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_env_parse_or_default_uses_default() {
        temp_env::with_var_unset("CATALOG_PARSE_UNSET", || {
            let value: u64 = env_parse_or_default("CATALOG_PARSE_UNSET", "30").unwrap();
            assert_eq!(value, 30);
        });
    }

    #[test]
    fn test_env_parse_or_default_trims_value() {
        temp_env::with_var("CATALOG_PARSE_SPACES", Some(" 42 "), || {
            let value: u32 = env_parse_or_default("CATALOG_PARSE_SPACES", "1").unwrap();
            assert_eq!(value, 42);
        });
    }

    #[test]
    fn test_env_parse_or_default_reports_key() {
        temp_env::with_var("CATALOG_PARSE_BAD", Some("yes please"), || {
            let result: Result<bool, _> = env_parse_or_default("CATALOG_PARSE_BAD", "true");
            match result {
                Err(ConfigError::ParseError { key, .. }) => assert_eq!(key, "CATALOG_PARSE_BAD"),
                other => panic!("expected ParseError, got {:?}", other),
            }
        });
    }
}
