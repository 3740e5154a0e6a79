//! Path-addressed blob storage.
//!
//! Keys are relative, `/`-separated paths such as `products/<name>`. The
//! [`BlobStorage`] trait is implemented by [`LocalBlobStorage`] for a
//! directory on disk and by [`InMemoryBlobStorage`] for tests.

mod config;
mod error;
mod key;
mod local;
mod memory;

pub use config::StorageConfig;
pub use error::{StorageError, StorageResult};
pub use key::{join_key, validate_key};
pub use local::LocalBlobStorage;
pub use memory::InMemoryBlobStorage;

use async_trait::async_trait;

/// Byte blob store addressed by key
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Write `bytes` at `key`, replacing any existing blob
    async fn put(&self, key: &str, bytes: &[u8]) -> StorageResult<()>;

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Remove the blob at `key`; [`StorageError::NotFound`] if there is none
    async fn delete(&self, key: &str) -> StorageResult<()>;

    async fn exists(&self, key: &str) -> StorageResult<bool>;
}
