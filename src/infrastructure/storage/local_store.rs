use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, error};
use crate::domain::{error::ScrapeError, ports::BlobStore};

/// [`BlobStore`] backed by the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct LocalStore;

impl LocalStore {
    pub fn new() -> Self {
        Self
    }
}

fn storage_error(action: &str, path: &Path, e: std::io::Error) -> ScrapeError {
    error!("Failed to {} {}: {}", action, path.display(), e);
    ScrapeError::Storage(format!("{} {}: {}", action, path.display(), e))
}

#[async_trait]
impl BlobStore for LocalStore {
    async fn ensure_dir(&self, dir: &Path) -> Result<(), ScrapeError> {
        if fs::metadata(dir).await.map(|m| m.is_dir()).unwrap_or(false) {
            debug!("Directory already exists: {}", dir.display());
            return Ok(());
        }
        fs::create_dir_all(dir)
            .await
            .map_err(|e| storage_error("create directory", dir, e))?;
        debug!("Created directory {}", dir.display());
        Ok(())
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), ScrapeError> {
        fs::write(path, bytes)
            .await
            .map_err(|e| storage_error("write", path, e))?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, ScrapeError> {
        fs::read(path).await.map_err(|e| storage_error("read", path, e))
    }

    async fn remove(&self, path: &Path) -> Result<bool, ScrapeError> {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_error("remove", path, e)),
        }
    }
}
