use core_config::{ConfigError, FromEnv, env_or_default};
use std::path::PathBuf;

const DEFAULT_ROOT: &str = "./storage/app";

/// Where [`crate::LocalBlobStorage`] keeps its files
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub root: PathBuf,
}

impl StorageConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl FromEnv for StorageConfig {
    /// - `STORAGE_ROOT`: defaults to `./storage/app`
    fn from_env() -> Result<Self, ConfigError> {
        let root = env_or_default("STORAGE_ROOT", DEFAULT_ROOT);
        if root.trim().is_empty() {
            return Err(ConfigError::ParseError {
                key: "STORAGE_ROOT".to_string(),
                details: "must not be empty".to_string(),
            });
        }
        Ok(Self::new(root))
    }
}
