use std::sync::Arc;

use tracing::{debug, error, info, warn};
use crate::{
    application::{
        media_downloader::{DownloadSummary, MediaDownloader},
        profile_fetcher::{load_raw_document, ProfileEndpoint, ProfileFetcher},
        profile_summarizer::ProfileSummarizer,
    },
    config::{Directories, Settings},
    domain::{
        models::ProcessedProfile,
        ports::{BlobStore, HttpTransport, IdentityProvider},
    },
    infrastructure::{http::ReqwestTransport, identity::RandomUserAgentPool, storage::LocalStore},
};

#[derive(Debug, Clone, Default)]
pub struct UserReport {
    pub username: String,
    pub fetched: bool,
    pub profile: Option<ProcessedProfile>,
    pub posts: Option<DownloadSummary>,
    pub errors: Vec<String>,
}

impl UserReport {
    pub fn is_complete(&self) -> bool {
        self.fetched && self.profile.is_some() && self.posts.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HarvestReport {
    pub users: Vec<UserReport>,
}

impl HarvestReport {
    pub fn completed(&self) -> usize {
        self.users.iter().filter(|u| u.is_complete()).count()
    }
}

/// Runs fetch, summary and post download for every configured username, one
/// user at a time.
pub struct HarvestService {
    fetcher: ProfileFetcher,
    summarizer: ProfileSummarizer,
    downloader: MediaDownloader,
    store: Arc<dyn BlobStore>,
    directories: Directories,
    usernames: Vec<String>,
}

impl HarvestService {
    pub fn new(settings: Settings) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        debug!("Initializing harvest service");

        match &settings.proxy {
            Some(proxy) => info!("Using proxy {}", proxy),
            None => info!("Using direct connections"),
        }
        let transport = Arc::new(ReqwestTransport::new(settings.proxy.as_ref())?);
        let identity = Arc::new(RandomUserAgentPool::default());
        let store = Arc::new(LocalStore::new());

        debug!("Harvest service initialization complete");
        Ok(Self::with_components(settings, transport, identity, store))
    }

    pub fn with_components(
        settings: Settings,
        transport: Arc<dyn HttpTransport>,
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn BlobStore>,
    ) -> Self {
        let image_policy = settings.image_policy();
        let fetcher = ProfileFetcher::new(transport.clone(), identity.clone(), store.clone())
            .with_endpoint(ProfileEndpoint::new(settings.endpoint.base_url.clone()))
            .with_retry_policy(settings.fetch.retry.clone())
            .with_block_signature(settings.fetch.block_signature());
        let summarizer = ProfileSummarizer::new(store.clone());
        let downloader = MediaDownloader::new(transport, identity, store.clone(), image_policy);

        Self {
            fetcher,
            summarizer,
            downloader,
            store,
            directories: settings.directories,
            usernames: settings.usernames,
        }
    }

    pub async fn run(&self) -> Result<HarvestReport, Box<dyn std::error::Error + Send + Sync>> {
        info!("Starting harvest for {} users", self.usernames.len());

        for dir in [
            &self.directories.raw,
            &self.directories.processed,
            &self.directories.pictures,
            &self.directories.posts,
        ] {
            self.store.ensure_dir(dir).await?;
        }

        let mut report = HarvestReport::default();
        for (i, username) in self.usernames.iter().enumerate() {
            debug!("Harvesting user {} of {}", i + 1, self.usernames.len());
            report.users.push(self.harvest_user(username).await);
        }

        info!(
            "✅ Harvest finished: {} of {} users complete",
            report.completed(),
            report.users.len()
        );
        Ok(report)
    }

    pub async fn harvest_user(&self, username: &str) -> UserReport {
        let dirs = &self.directories;
        let mut report = UserReport { username: username.to_string(), ..Default::default() };

        if let Err(e) = self.fetcher.fetch(username, &dirs.raw).await {
            warn!("Skipping {}: {}", username, e);
            report.errors.push(e.to_string());
            return report;
        }
        report.fetched = true;

        let raw = match load_raw_document(self.store.as_ref(), &dirs.raw, username).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Cannot reload stored profile for {}: {}", username, e);
                report.errors.push(e.to_string());
                return report;
            }
        };

        match self.summarizer.process_user(username, &raw, &dirs.processed).await {
            Ok(profile) => report.profile = Some(profile),
            Err(e) => {
                error!("Failed to summarize {}: {}", username, e);
                report.errors.push(e.to_string());
            }
        }

        match self.downloader.download_posts(username, &raw, &dirs.pictures, &dirs.posts).await {
            Ok(summary) => report.posts = Some(summary),
            Err(e) => {
                error!("Failed to download posts for {}: {}", username, e);
                report.errors.push(e.to_string());
            }
        }

        report
    }
}
