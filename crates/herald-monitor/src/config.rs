//! Monitor configuration.

use std::time::Duration;

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Default bound for a single external call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the torrent monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// How often to poll the torrent list.
    pub poll_interval: Duration,
    /// Upper bound for one fetch or one notifier call.
    pub request_timeout: Duration,
    /// Whether transitions into the error state are reported.
    pub notify_errors: bool,
    /// How often to send a status digest, if at all.
    pub status_interval: Option<Duration>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            notify_errors: true,
            status_interval: None,
        }
    }
}

impl MonitorConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the per-call timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Enables or disables error notifications.
    pub fn with_notify_errors(mut self, enabled: bool) -> Self {
        self.notify_errors = enabled;
        self
    }

    /// Sets the status digest interval. `None` disables the digest.
    pub fn with_status_interval(mut self, interval: Option<Duration>) -> Self {
        self.status_interval = interval;
        self
    }
}
