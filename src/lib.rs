//! Fetches a public profile document, summarizes it, and mirrors its recent
//! posts (record + image) onto local storage.

pub mod application;
pub mod config;
pub mod domain;
pub mod harvest_service;
pub mod infrastructure;

use std::path::Path;
use std::sync::Arc;

use tracing::error;

pub use application::{
    media_downloader::{DownloadSummary, ImageFetchPolicy, MediaDownloader},
    profile_fetcher::{load_raw_document, ProfileEndpoint, ProfileFetcher},
    profile_summarizer::{summarize, ProfileSummarizer},
    retry::{DelayStrategy, RetryPolicy},
};
pub use domain::{
    error::ScrapeError,
    models::{PostRecord, ProcessedProfile, ProxyConfig, RawProfileDocument},
};

use infrastructure::{http::ReqwestTransport, identity::RandomUserAgentPool, storage::LocalStore};

/// Fetches `username`'s profile into `<output_dir>/<username>` with the default
/// identity pool and an unbounded retry policy. Returns whether a document was stored.
pub async fn fetch_profile(username: &str, output_dir: &Path, proxy: Option<&ProxyConfig>) -> bool {
    let transport = match ReqwestTransport::new(proxy) {
        Ok(transport) => transport,
        Err(e) => {
            error!("Cannot set up transport: {}", e);
            return false;
        }
    };
    ProfileFetcher::new(
        Arc::new(transport),
        Arc::new(RandomUserAgentPool::default()),
        Arc::new(LocalStore::new()),
    )
    .fetch_profile(username, output_dir)
    .await
}

/// Summarizes `raw` into `<processed_dir>/<username>`.
pub async fn process_user(
    username: &str,
    raw: &RawProfileDocument,
    processed_dir: &Path,
) -> Result<ProcessedProfile, ScrapeError> {
    ProfileSummarizer::new(Arc::new(LocalStore::new()))
        .process_user(username, raw, processed_dir)
        .await
}

/// Mirrors the document's posts into `pic_dir` and `post_dir`. With a proxy,
/// each image gets eleven five-second attempts; without one, a single attempt.
pub async fn download_posts(
    username: &str,
    raw: &RawProfileDocument,
    pic_dir: &Path,
    post_dir: &Path,
    proxy: Option<&ProxyConfig>,
) -> Result<DownloadSummary, ScrapeError> {
    let transport = ReqwestTransport::new(proxy)?;
    MediaDownloader::new(
        Arc::new(transport),
        Arc::new(RandomUserAgentPool::default()),
        Arc::new(LocalStore::new()),
        ImageFetchPolicy::for_proxy(proxy),
    )
    .download_posts(username, raw, pic_dir, post_dir)
    .await
}
