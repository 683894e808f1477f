use std::future::Future;
use std::time::Duration;

use crate::domain::error::ScrapeError;

/// Races `operation` against `limit`.
///
/// Expiry drops the operation future and yields [`ScrapeError::Timeout`], an
/// ordinary failed outcome. Nothing the operation already persisted is undone.
pub async fn run_with_deadline<F, T>(limit: Option<Duration>, operation: F) -> Result<T, ScrapeError>
where
    F: Future<Output = Result<T, ScrapeError>>,
{
    match limit {
        None => operation.await,
        Some(limit) => tokio::time::timeout(limit, operation)
            .await
            .map_err(|_| ScrapeError::Timeout(limit))?,
    }
}
