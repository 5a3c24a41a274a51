//! Error types for the Jackett client.

use thiserror::Error;

/// Errors that can occur when searching through Jackett.
#[derive(Debug, Error)]
pub enum JackettError {
    /// The base URL could not be parsed.
    #[error("Invalid Jackett URL: {0}")]
    InvalidUrl(String),

    /// The search query is blank.
    #[error("Search query is empty")]
    EmptyQuery,

    /// Transport-level failure (connection refused, timeout, TLS, ...).
    #[error("Could not reach Jackett: {0}")]
    Connection(String),

    /// Jackett answered with an error status, e.g. for a bad API key.
    #[error("Jackett returned status {status} for indexer {indexer}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Indexer that was queried.
        indexer: String,
    },

    /// The response body did not match the expected schema.
    #[error("Malformed response from indexer {indexer}: {message}")]
    Parse {
        /// Indexer that was queried.
        indexer: String,
        /// Parser message.
        message: String,
    },

    /// Every configured indexer failed.
    #[error("All {count} indexers failed, last error: {last}")]
    AllIndexersFailed {
        /// Number of indexers queried.
        count: usize,
        /// The last failure.
        last: Box<JackettError>,
    },
}

/// Result type for Jackett operations.
pub type Result<T> = std::result::Result<T, JackettError>;

impl From<reqwest::Error> for JackettError {
    fn from(e: reqwest::Error) -> Self {
        JackettError::Connection(e.to_string())
    }
}
