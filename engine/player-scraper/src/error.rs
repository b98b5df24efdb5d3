//! Error types for fetching and parsing season pages

use thiserror::Error;

/// Result type alias for scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Errors that can occur while fetching or parsing a season page
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// The request could not be sent or the body could not be read
    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("HTTP request to {url} failed with status: {status}")]
    Status { url: String, status: reqwest::StatusCode },

    /// The document does not have the expected table structure
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ScrapeError {
    /// Create a new parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Whether this error came from the network side (transport or status)
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Status { .. })
    }
}
