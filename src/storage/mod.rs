//! Object storage abstraction for uploaded documents.
//!
//! Path-addressed upload/download behind a trait, with a local filesystem
//! backend rooted at a configured directory.

use crate::error::{PodiumError, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};

/// Trait for path-addressed object storage.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store raw bytes under a path.
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Fetch raw bytes stored under a path.
    async fn download(&self, path: &str) -> Result<Vec<u8>>;
}

/// Local filesystem storage rooted at a directory.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create a storage backend rooted at `root`, creating it if missing.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Resolve a stored path under the root, rejecting traversal segments.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let traversal = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if traversal || path.is_empty() {
            return Err(PodiumError::Storage(format!("Invalid storage path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    #[instrument(skip(self, bytes))]
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;

        debug!("Stored {} bytes at {:?}", bytes.len(), full);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        tokio::fs::read(&full)
            .await
            .map_err(|e| PodiumError::Storage(format!("Failed to download {}: {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_download_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();

        storage
            .upload("user-a/notes.txt", b"hello podium")
            .await
            .unwrap();
        let bytes = storage.download("user-a/notes.txt").await.unwrap();

        assert_eq!(bytes, b"hello podium");
    }

    #[tokio::test]
    async fn test_download_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();

        let err = storage.download("user-a/absent.txt").await.unwrap_err();
        assert!(matches!(err, PodiumError::Storage(_)));
    }

    #[tokio::test]
    async fn test_traversal_paths_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();

        let err = storage.download("../outside.txt").await.unwrap_err();
        assert!(matches!(err, PodiumError::Storage(_)));
        let err = storage.upload("/etc/motd", b"nope").await.unwrap_err();
        assert!(matches!(err, PodiumError::Storage(_)));
    }
}
