use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};
use crate::application::retry::RetryPolicy;
use crate::domain::{
    error::ScrapeError,
    models::{BlockSignature, RawProfileDocument, Username},
    ports::{BlobStore, HttpTransport, IdentityProvider},
};

pub const DEFAULT_BASE_URL: &str = "https://www.instagram.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEndpoint {
    base_url: String,
}

impl ProfileEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn profile_url(&self, username: &Username) -> String {
        format!("{}/{}/?__a=1&__d=dis", self.base_url, username)
    }
}

impl Default for ProfileEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Polls the profile endpoint until it returns a usable document, then
/// persists it as `<output_dir>/<username>`.
pub struct ProfileFetcher {
    transport: Arc<dyn HttpTransport>,
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn BlobStore>,
    endpoint: ProfileEndpoint,
    retry: RetryPolicy,
    block_signature: BlockSignature,
}

impl ProfileFetcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            transport,
            identity,
            store,
            endpoint: ProfileEndpoint::default(),
            retry: RetryPolicy::unbounded(),
            block_signature: BlockSignature::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: ProfileEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_block_signature(mut self, block_signature: BlockSignature) -> Self {
        self.block_signature = block_signature;
        self
    }

    /// Boolean form of [`ProfileFetcher::fetch`]: `true` once the document is on disk.
    pub async fn fetch_profile(&self, username: &str, output_dir: &Path) -> bool {
        self.fetch(username, output_dir).await.is_ok()
    }

    pub async fn fetch(&self, username: &str, output_dir: &Path) -> Result<RawProfileDocument, ScrapeError> {
        let username = Username::parse(username).map_err(|e| {
            error!("Refusing to fetch profile: {}", e);
            e
        })?;
        info!("Fetching profile for {}", username);

        let url = self.endpoint.profile_url(&username);
        let mut attempts = 0u32;

        let document = loop {
            attempts += 1;
            debug!("Requesting {} (attempt {})", url, attempts);

            match self.attempt(&username, &url).await {
                Ok(document) => break document,
                Err(e) if e.is_transient() => {
                    warn!("Failed retrieving profile for {} (attempt {}): {}", username, attempts, e);
                    if !self.retry.allows_another(attempts) {
                        error!("Giving up on {} after {} attempts", username, attempts);
                        return Err(ScrapeError::RetriesExhausted {
                            username: username.to_string(),
                            attempts,
                        });
                    }
                    let delay = self.retry.delay.delay_after(attempts);
                    if !delay.is_zero() {
                        debug!("Waiting {:?} before retrying {}", delay, username);
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => {
                    error!("Failed retrieving profile for {}: {}", username, e);
                    return Err(e);
                }
            }
        };

        self.store.ensure_dir(output_dir).await?;
        let path = output_dir.join(username.as_str());
        self.store.write(&path, &document.to_pretty_bytes()?).await?;

        info!("✅ Successfully retrieved profile for {} after {} attempt(s)", username, attempts);
        Ok(document)
    }

    async fn attempt(&self, username: &Username, url: &str) -> Result<RawProfileDocument, ScrapeError> {
        let user_agent = self.identity.user_agent();
        let response = self.transport.get(url, &user_agent).await?;

        if response.status == 404 {
            return Err(ScrapeError::NotFound(username.to_string()));
        }

        let value: Value = serde_json::from_slice(&response.body).map_err(|e| {
            ScrapeError::TransientBlock(format!("status {}, body is not JSON: {}", response.status, e))
        })?;

        if !value.is_object() {
            return Err(ScrapeError::TransientBlock(format!(
                "status {}, body is not a JSON object",
                response.status
            )));
        }
        if self.block_signature.matches(&value) {
            let message = value.get("message").and_then(Value::as_str).unwrap_or_default();
            return Err(ScrapeError::TransientBlock(format!(
                "status {}, blocked: {:?}",
                response.status, message
            )));
        }

        Ok(RawProfileDocument::new(value))
    }
}

/// Reads back a document written by [`ProfileFetcher::fetch`].
pub async fn load_raw_document(
    store: &dyn BlobStore,
    raw_dir: &Path,
    username: &str,
) -> Result<RawProfileDocument, ScrapeError> {
    let username = Username::parse(username)?;
    let bytes = store.read(&raw_dir.join(username.as_str())).await?;
    RawProfileDocument::from_slice(&bytes)
}
