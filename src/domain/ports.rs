use std::path::Path;

use async_trait::async_trait;

use crate::domain::{error::ScrapeError, models::HttpResponse};

/// Issues GET requests. Proxy routing is a property of the implementation.
///
/// `Err` means the request never produced a response (connect, DNS, TLS,
/// broken body); any HTTP status, including 404, is an `Ok`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, user_agent: &str) -> Result<HttpResponse, ScrapeError>;
}

/// Supplies the user-agent string for the next request.
pub trait IdentityProvider: Send + Sync {
    fn user_agent(&self) -> String;
}

/// Path-keyed byte storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn ensure_dir(&self, dir: &Path) -> Result<(), ScrapeError>;
    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), ScrapeError>;
    async fn read(&self, path: &Path) -> Result<Vec<u8>, ScrapeError>;
    /// Returns whether something was removed.
    async fn remove(&self, path: &Path) -> Result<bool, ScrapeError>;
}
