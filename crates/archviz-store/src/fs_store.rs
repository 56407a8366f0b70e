//! Filesystem-backed artifact store.

use archviz_types::{ArtifactStore, StorageError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Stores artifacts as flat files under a single root directory.
///
/// Writes go to a hidden temp file in the same directory and are renamed into
/// place, so a reader never observes a partially written artifact.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Create the store, creating `root` if needed. An existing directory is fine.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        tracing::debug!(root = %root.display(), "artifact store ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `filename` under the root. Rejects anything that is not a plain file name.
    pub fn path(&self, filename: &str) -> Result<PathBuf, StorageError> {
        if filename.is_empty()
            || filename.starts_with('.')
            || filename.contains(['/', '\\'])
            || filename.contains("..")
        {
            return Err(StorageError::InvalidName(filename.to_string()));
        }
        Ok(self.root.join(filename))
    }
}

#[async_trait::async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn exists(&self, filename: &str) -> Result<bool, StorageError> {
        let path = self.path(filename)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn write(&self, filename: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path(filename)?;
        if self.exists(filename).await? {
            tracing::debug!(filename, "artifact already present, skipping write");
            return Ok(());
        }
        let tmp = self
            .root
            .join(format!(".{}.{}.part", filename, Uuid::new_v4()));
        if let Err(e) = write_synced(&tmp, bytes).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tracing::info!(
            path = %path.display(),
            size_bytes = bytes.len(),
            "artifact written"
        );
        Ok(())
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut f = fs::File::create(path).await?;
    f.write_all(bytes).await?;
    f.sync_all().await?;
    Ok(())
}
