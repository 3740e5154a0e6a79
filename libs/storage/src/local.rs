use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{BlobStorage, StorageConfig, StorageError, StorageResult, validate_key};

/// Blobs stored as files under a root directory.
///
/// A key maps to `root/<key>`; intermediate directories are created on
/// write. Each write goes to its own temporary file next to the destination
/// and is renamed into place, so readers never see a partial blob and
/// concurrent writers of one key never share a temporary file.
#[derive(Clone, Debug)]
pub struct LocalBlobStorage {
    root: PathBuf,
}

impl LocalBlobStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.root.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, segment| path.join(segment)))
    }
}

fn not_found_as(key: &str) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |e| match e.kind() {
        ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
        _ => StorageError::Io(e),
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut partial = path.clone().into_os_string();
        partial.push(format!(".{}.partial", Uuid::new_v4().simple()));
        let partial = PathBuf::from(partial);

        fs::write(&partial, bytes).await?;
        if let Err(e) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(e.into());
        }

        debug!(path = %path.display(), "Blob written");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.path_for(key)?;
        fs::read(&path).await.map_err(not_found_as(key))
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        fs::remove_file(&path).await.map_err(not_found_as(key))?;
        debug!(path = %path.display(), "Blob deleted");
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.path_for(key)?;
        Ok(fs::try_exists(&path).await?)
    }
}
