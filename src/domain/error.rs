use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("user {0} does not exist")]
    NotFound(String),

    #[error("blocked or unreadable response: {0}")]
    TransientBlock(String),

    #[error("gave up on {username} after {attempts} attempts")]
    RetriesExhausted { username: String, attempts: u32 },

    #[error("unexpected document structure: {0}")]
    Structure(String),

    #[error("image download failed: {0}")]
    ImageDownload(String),

    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid username: {0:?}")]
    InvalidUsername(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ScrapeError {
    /// Whether the profile fetch loop should try again after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, ScrapeError::TransientBlock(_))
    }
}
