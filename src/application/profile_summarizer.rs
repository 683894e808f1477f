use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};
use crate::domain::{
    error::ScrapeError,
    models::{to_indented_json, ProcessedProfile, RawProfileDocument, Username, RECORD_JSON_INDENT},
    ports::BlobStore,
    schema,
};

/// Pure extraction of the processed profile from a raw document.
pub fn summarize(username: &str, raw: &RawProfileDocument) -> Result<ProcessedProfile, ScrapeError> {
    let username = Username::parse(username)?;
    schema::profile_summary(&username, raw)
}

pub struct ProfileSummarizer {
    store: Arc<dyn BlobStore>,
}

impl ProfileSummarizer {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Summarizes `raw` and writes the result to `<processed_dir>/<username>`.
    pub async fn process_user(
        &self,
        username: &str,
        raw: &RawProfileDocument,
        processed_dir: &Path,
    ) -> Result<ProcessedProfile, ScrapeError> {
        let profile = summarize(username, raw)?;
        debug!(
            "Summarized {}: {} categories, {} followers, {} followees",
            profile.username,
            profile.category.len(),
            profile.num_followers,
            profile.num_followees
        );

        self.store.ensure_dir(processed_dir).await?;
        let path = processed_dir.join(&profile.username);
        self.store
            .write(&path, &to_indented_json(&profile, RECORD_JSON_INDENT)?)
            .await?;

        info!("Wrote processed profile for {} to {}", profile.username, path.display());
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::profile_document;
    use crate::infrastructure::storage::LocalStore;
    use serde_json::json;

    #[test]
    fn summary_matches_raw_counts_and_categories() {
        let raw = RawProfileDocument::new(profile_document(12));
        let profile = summarize("nasa", &raw).unwrap();

        assert_eq!(profile.num_followers, 97_000_000);
        assert_eq!(profile.num_followees, 81);
        assert_eq!(profile.category, vec!["Science", "Government Organization"]);
        assert_eq!(profile.id, "528817151");
        assert_eq!(profile.biography, "Explore the universe");
    }

    #[test]
    fn blocked_payload_is_a_structure_error() {
        let raw = RawProfileDocument::new(json!({"message": "", "require_login": true, "status": "fail"}));
        assert!(matches!(summarize("nasa", &raw), Err(ScrapeError::Structure(_))));
    }

    #[tokio::test]
    async fn processed_profile_is_written_per_username() {
        let dir = tempfile::tempdir().unwrap();
        let summarizer = ProfileSummarizer::new(Arc::new(LocalStore::new()));
        let raw = RawProfileDocument::new(profile_document(1));

        let profile = summarizer.process_user("nasa", &raw, dir.path()).await.unwrap();

        let text = std::fs::read_to_string(dir.path().join("nasa")).unwrap();
        let stored: ProcessedProfile = serde_json::from_str(&text).unwrap();
        assert_eq!(stored, profile);
        assert!(text.starts_with("{\n      \"username\": \"nasa\""));
    }
}
