use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};
use crate::application::{
    media_downloader::{ImageFetchPolicy, PROXIED_IMAGE_ATTEMPTS},
    profile_fetcher::DEFAULT_BASE_URL,
    retry::RetryPolicy,
};
use crate::domain::{
    error::ScrapeError,
    models::{BlockSignature, ProxyConfig, DEFAULT_BLOCK_KEYS},
};

pub const CONFIG_PATH_VAR: &str = "PROFILE_INGESTION_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "ingestion.yaml";
pub const PROXY_USERNAME_VAR: &str = "SMARTPROXY_USERNAME";
pub const PROXY_PASSWORD_VAR: &str = "SMARTPROXY_PASSWORD";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub usernames: Vec<String>,
    pub directories: Directories,
    #[serde(default)]
    pub endpoint: EndpointSettings,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub images: ImageSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Directories {
    pub raw: PathBuf,
    pub processed: PathBuf,
    pub pictures: PathBuf,
    pub posts: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointSettings {
    pub base_url: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    #[serde(flatten)]
    pub retry: RetryPolicy,
    #[serde(default = "default_block_keys")]
    pub block_keys: Vec<String>,
}

fn default_block_keys() -> Vec<String> {
    DEFAULT_BLOCK_KEYS.iter().map(|k| k.to_string()).collect()
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self { retry: RetryPolicy::unbounded(), block_keys: default_block_keys() }
    }
}

impl FetchSettings {
    pub fn block_signature(&self) -> BlockSignature {
        BlockSignature::new(self.block_keys.iter().cloned())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageSettings {
    #[serde(default = "default_proxied_attempts")]
    pub proxied_attempts: u32,
    #[serde(default = "default_proxied_timeout_secs")]
    pub proxied_timeout_secs: u64,
}

fn default_proxied_attempts() -> u32 {
    PROXIED_IMAGE_ATTEMPTS
}

fn default_proxied_timeout_secs() -> u64 {
    5
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            proxied_attempts: default_proxied_attempts(),
            proxied_timeout_secs: default_proxied_timeout_secs(),
        }
    }
}

impl Settings {
    /// Loads the file named by `PROFILE_INGESTION_CONFIG` (or `ingestion.yaml`)
    /// and applies the proxy credential overrides from the environment.
    pub fn from_env() -> Result<Self, ScrapeError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        info!("Loading configuration from {}", path);
        let mut settings = Self::load(Path::new(&path))?;
        settings.apply_proxy_overrides(
            std::env::var(PROXY_USERNAME_VAR).ok(),
            std::env::var(PROXY_PASSWORD_VAR).ok(),
        );
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ScrapeError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ScrapeError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ScrapeError> {
        let settings: Settings = serde_yaml::from_str(text).map_err(|e| ScrapeError::Config(e.to_string()))?;
        if settings.fetch.block_keys.is_empty() {
            return Err(ScrapeError::Config("fetch.block_keys must not be empty".to_string()));
        }
        debug!("Parsed settings for {} usernames", settings.usernames.len());
        Ok(settings)
    }

    /// Credentials from the environment win over the file. A proxy section is
    /// created only when both values are present.
    pub fn apply_proxy_overrides(&mut self, username: Option<String>, password: Option<String>) {
        if let Some(proxy) = self.proxy.as_mut() {
            if let Some(username) = username {
                proxy.username = username;
            }
            if let Some(password) = password {
                proxy.password = password;
            }
        } else if let (Some(username), Some(password)) = (username, password) {
            self.proxy = Some(ProxyConfig::new(username, password));
        }
    }

    pub fn image_policy(&self) -> ImageFetchPolicy {
        match self.proxy {
            Some(_) => ImageFetchPolicy {
                max_attempts: self.images.proxied_attempts.max(1),
                attempt_timeout: Some(Duration::from_secs(self.images.proxied_timeout_secs)),
            },
            None => ImageFetchPolicy::direct(),
        }
    }
}
