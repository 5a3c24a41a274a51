//! Error types for the monitor crate.

use thiserror::Error;

/// Errors that can occur in the monitor.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The torrent list could not be fetched or parsed.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// A notification could not be delivered.
    #[error("notify error: {0}")]
    Notify(String),

    /// Monitor not started.
    #[error("monitor not started")]
    NotStarted,

    /// Monitor already started.
    #[error("monitor already started")]
    AlreadyStarted,

    /// The monitor task panicked and took its monitor with it.
    #[error("monitor was lost: {0}")]
    Lost(String),

    /// Shutdown error.
    #[error("shutdown error: {0}")]
    Shutdown(String),
}

/// Result type for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
