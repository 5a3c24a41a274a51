//! Error types for the qBittorrent client.

use thiserror::Error;

/// Errors that can occur when talking to qBittorrent.
#[derive(Debug, Error)]
pub enum QbitError {
    /// The base URL could not be parsed.
    #[error("Invalid qBittorrent URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The Web API answered with an unexpected status code.
    #[error("qBittorrent returned status {status} for {endpoint}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// API endpoint that was called.
        endpoint: String,
    },

    /// The session cookie is missing or expired.
    #[error("qBittorrent session expired (403)")]
    AuthExpired,

    /// The Web API did not accept the configured credentials.
    #[error("qBittorrent rejected the login credentials")]
    LoginRejected,

    /// The Web API accepted the request but refused to act on it.
    #[error("qBittorrent refused the request: {0}")]
    Rejected(String),

    /// The response body did not match the expected schema.
    #[error("Malformed response from {endpoint}: {message}")]
    Parse {
        /// API endpoint that was called.
        endpoint: String,
        /// Parser message.
        message: String,
    },
}

/// Result type for qBittorrent operations.
pub type Result<T> = std::result::Result<T, QbitError>;

impl From<reqwest::Error> for QbitError {
    fn from(e: reqwest::Error) -> Self {
        QbitError::HttpError(e.to_string())
    }
}
