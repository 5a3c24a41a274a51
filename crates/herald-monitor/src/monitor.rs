//! The polling monitor.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{interval, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::config::MonitorConfig;
use crate::notifier::Notifier;
use crate::source::TorrentSource;
use crate::state::MonitorState;

/// What one poll tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The listing could not be fetched; state was left untouched.
    FetchFailed,
    /// The listing was fetched and applied.
    Updated {
        /// Torrents in the fresh listing after de-duplication.
        torrents: usize,
        /// Notifications dispatched.
        notified: usize,
        /// Notifications the notifier failed to deliver.
        failed: usize,
    },
}

/// Polls a [`TorrentSource`], diffs each listing against the last one and
/// reports transitions to a [`Notifier`].
///
/// The monitor owns its [`MonitorState`]; nothing else mutates it.
pub struct TorrentMonitor {
    source: Arc<dyn TorrentSource>,
    notifier: Arc<dyn Notifier>,
    config: MonitorConfig,
    state: MonitorState,
    last_report: Option<Instant>,
}

impl TorrentMonitor {
    /// Creates a monitor with empty state.
    pub fn new(
        source: Arc<dyn TorrentSource>,
        notifier: Arc<dyn Notifier>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            source,
            notifier,
            config,
            state: MonitorState::new(),
            last_report: None,
        }
    }

    /// The monitor configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// The last observed state.
    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Run one poll tick.
    ///
    /// Never fails: a fetch failure leaves the state unchanged, and a notifier
    /// failure is logged after the state has already been updated so the same
    /// transition is not reported again on the next tick.
    pub async fn poll(&mut self) -> PollOutcome {
        let request_timeout = self.config.request_timeout;

        let fresh = match timeout(request_timeout, self.source.list_torrents()).await {
            Ok(Ok(torrents)) => torrents,
            Ok(Err(e)) => {
                warn!(error = %e, "failed to fetch torrent list, keeping previous state");
                return PollOutcome::FetchFailed;
            }
            Err(_) => {
                warn!(
                    timeout_ms = request_timeout.as_millis(),
                    "torrent list fetch timed out, keeping previous state"
                );
                return PollOutcome::FetchFailed;
            }
        };

        let update = self.state.apply(fresh, self.config.notify_errors);
        if update.added > 0 || update.removed > 0 {
            debug!(
                added = update.added,
                removed = update.removed,
                tracked = self.state.len(),
                "torrent set changed"
            );
        }

        let mut failed = 0;
        for event in &update.events {
            match timeout(request_timeout, self.notifier.notify(event)).await {
                Ok(Ok(())) => {
                    info!(
                        torrent_id = %event.torrent_id,
                        name = %event.name,
                        kind = %event.kind,
                        "notification sent"
                    );
                }
                Ok(Err(e)) => {
                    failed += 1;
                    warn!(torrent_id = %event.torrent_id, kind = %event.kind, error = %e, "failed to send notification");
                }
                Err(_) => {
                    failed += 1;
                    warn!(torrent_id = %event.torrent_id, kind = %event.kind, "notification timed out");
                }
            }
        }

        self.report_status_if_due().await;

        PollOutcome::Updated {
            torrents: self.state.len(),
            notified: update.events.len() - failed,
            failed,
        }
    }

    /// Send the periodic status digest when it is enabled and due.
    async fn report_status_if_due(&mut self) {
        let Some(every) = self.config.status_interval else {
            return;
        };

        let now = Instant::now();
        if let Some(last) = self.last_report {
            if now.duration_since(last) < every {
                return;
            }
        }
        self.last_report = Some(now);

        let torrents = self.state.snapshot();
        match timeout(self.config.request_timeout, self.notifier.status_report(&torrents)).await {
            Ok(Ok(())) => debug!(torrents = torrents.len(), "status report sent"),
            Ok(Err(e)) => warn!(error = %e, "failed to send status report"),
            Err(_) => warn!("status report timed out"),
        }
    }

    /// Run the polling loop until the shutdown signal is raised.
    ///
    /// Ticks run one after another; a slow tick delays the next one instead of
    /// overlapping it. Shutdown abandons an in-flight tick.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let poll_interval = self.config.poll_interval;
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            poll_interval_secs = poll_interval.as_secs(),
            notify_errors = self.config.notify_errors,
            "starting torrent monitor"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tokio::select! {
                        outcome = self.poll() => {
                            trace!(?outcome, "poll finished");
                        }
                        _ = shutdown_requested(&mut shutdown) => {
                            debug!("shutdown requested during poll, abandoning it");
                            break;
                        }
                    }
                }
                _ = shutdown_requested(&mut shutdown) => {
                    debug!("monitor received shutdown signal");
                    break;
                }
            }
        }

        info!("torrent monitor stopped");
    }
}

/// Resolves once the shutdown flag is set or its sender is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
