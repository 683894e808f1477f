use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use crate::application::deadline::run_with_deadline;
use crate::domain::{
    error::ScrapeError,
    models::{to_indented_json, PostRecord, ProxyConfig, RawProfileDocument, Username, RECORD_JSON_INDENT},
    ports::{BlobStore, HttpTransport, IdentityProvider},
    schema,
};

pub const PROXIED_IMAGE_ATTEMPTS: u32 = 11;
pub const PROXIED_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Attempt budget for a single image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFetchPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Option<Duration>,
}

impl ImageFetchPolicy {
    /// One attempt with no deadline: a stalled server holds up the batch
    /// until the transport gives up, unlike the time-boxed proxied path.
    pub fn direct() -> Self {
        Self { max_attempts: 1, attempt_timeout: None }
    }

    /// Eleven attempts, five seconds each.
    pub fn proxied() -> Self {
        Self {
            max_attempts: PROXIED_IMAGE_ATTEMPTS,
            attempt_timeout: Some(PROXIED_ATTEMPT_TIMEOUT),
        }
    }

    pub fn for_proxy(proxy: Option<&ProxyConfig>) -> Self {
        match proxy {
            Some(_) => Self::proxied(),
            None => Self::direct(),
        }
    }
}

impl Default for ImageFetchPolicy {
    fn default() -> Self {
        Self::direct()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub saved: Vec<String>,
    pub skipped: Vec<String>,
}

pub struct MediaDownloader {
    transport: Arc<dyn HttpTransport>,
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn BlobStore>,
    policy: ImageFetchPolicy,
}

fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

impl MediaDownloader {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn BlobStore>,
        policy: ImageFetchPolicy,
    ) -> Self {
        Self { transport, identity, store, policy }
    }

    /// Writes `<post_dir>/<username>/<post_id>` and `<pic_dir>/<username>/<post_id>.jpg`
    /// for every timeline post.
    ///
    /// A post whose image cannot be fetched leaves neither file behind; the
    /// remaining posts are still processed. Only a malformed document or an
    /// unusable output directory fails the whole call.
    pub async fn download_posts(
        &self,
        username: &str,
        raw: &RawProfileDocument,
        pic_dir: &Path,
        post_dir: &Path,
    ) -> Result<DownloadSummary, ScrapeError> {
        let username = Username::parse(username)?;
        info!("Downloading {}'s post records and images", username);

        let posts = schema::timeline_posts(raw).map_err(|e| {
            error!("Cannot read timeline for {}: {}", username, e);
            e
        })?;

        let pic_dir = pic_dir.join(username.as_str());
        let post_dir = post_dir.join(username.as_str());
        self.store.ensure_dir(&pic_dir).await?;
        self.store.ensure_dir(&post_dir).await?;

        info!("Found {} posts for {}", posts.len(), username);
        let mut summary = DownloadSummary::default();

        for (i, post) in posts.iter().enumerate() {
            debug!("Processing post {} of {}: {}", i + 1, posts.len(), post.post_id);
            match self.save_post(post, &pic_dir, &post_dir).await {
                Ok(()) => summary.saved.push(post.post_id.clone()),
                Err(e) => {
                    warn!("Skipping post {} of {}: {}", post.post_id, username, e);
                    summary.skipped.push(post.post_id.clone());
                }
            }
        }

        info!(
            "✅ Finished posts for {}: {} saved, {} skipped",
            username,
            summary.saved.len(),
            summary.skipped.len()
        );
        Ok(summary)
    }

    async fn save_post(&self, post: &PostRecord, pic_dir: &Path, post_dir: &Path) -> Result<(), ScrapeError> {
        if !is_safe_file_name(&post.post_id) {
            return Err(ScrapeError::Structure(format!("unusable post id {:?}", post.post_id)));
        }

        let record_path = post_dir.join(&post.post_id);
        let image_path = pic_dir.join(format!("{}.jpg", post.post_id));

        self.store
            .write(&record_path, &to_indented_json(post, RECORD_JSON_INDENT)?)
            .await?;

        if let Err(e) = self.retrieve_image(&post.img_url, &image_path).await {
            // Keep records and images paired.
            if let Err(cleanup) = self.store.remove(&record_path).await {
                error!("Could not remove orphaned record {}: {}", record_path.display(), cleanup);
            }
            if let Err(cleanup) = self.store.remove(&image_path).await {
                error!("Could not remove partial image {}: {}", image_path.display(), cleanup);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Fetches `url` into `dest`, retrying within the policy's attempt budget.
    /// Returns the number of attempts used.
    pub async fn retrieve_image(&self, url: &str, dest: &Path) -> Result<u32, ScrapeError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match self.attempt_image(url, dest).await {
                Ok(()) => {
                    debug!("Saved {} to {} on attempt {}", url, dest.display(), attempt);
                    return Ok(attempt);
                }
                Err(e) => {
                    debug!("Image attempt {}/{} for {} failed: {}", attempt, max_attempts, url, e);
                    last_error = Some(e);
                }
            }
        }

        let reason = last_error.map(|e| e.to_string()).unwrap_or_default();
        Err(ScrapeError::ImageDownload(format!(
            "{} after {} attempt(s): {}",
            url, max_attempts, reason
        )))
    }

    async fn attempt_image(&self, url: &str, dest: &Path) -> Result<(), ScrapeError> {
        let user_agent = self.identity.user_agent();
        let response = run_with_deadline(self.policy.attempt_timeout, self.transport.get(url, &user_agent)).await?;

        if !response.is_success() {
            return Err(ScrapeError::ImageDownload(format!("status {}", response.status)));
        }
        self.store.write(dest, &response.body).await
    }
}
