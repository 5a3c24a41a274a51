//! Background task management for the monitor.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::{MonitorError, Result};
use crate::monitor::TorrentMonitor;

/// Runs a [`TorrentMonitor`] on its own tokio task.
///
/// The monitor is moved into the task while running and handed back on
/// shutdown, so its state is only ever touched by one task.
pub struct MonitorRuntime {
    /// The monitor while idle.
    monitor: Option<TorrentMonitor>,
    /// Handle to the running monitor task.
    handle: Option<JoinHandle<TorrentMonitor>>,
    /// Why the monitor is gone, if its task panicked.
    lost: Option<String>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
}

impl MonitorRuntime {
    /// Create a runtime for the given monitor.
    pub fn new(monitor: TorrentMonitor) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            monitor: Some(monitor),
            handle: None,
            lost: None,
            shutdown_tx,
        }
    }

    /// Spawn the polling loop.
    pub fn start(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Err(MonitorError::AlreadyStarted);
        }
        let mut monitor = match self.monitor.take() {
            Some(monitor) => monitor,
            None => {
                let reason = self.lost.clone().unwrap_or_else(|| "no monitor".to_string());
                return Err(MonitorError::Lost(reason));
            }
        };

        info!("starting monitor runtime");

        self.shutdown_tx.send_replace(false);
        let shutdown_rx = self.shutdown_tx.subscribe();

        self.handle = Some(tokio::spawn(async move {
            monitor.run(shutdown_rx).await;
            monitor
        }));

        debug!("monitor runtime started");
        Ok(())
    }

    /// Stop the polling loop and wait for the task to finish.
    pub async fn shutdown(&mut self) -> Result<()> {
        let handle = self.handle.take().ok_or(MonitorError::NotStarted)?;

        info!("shutting down monitor runtime");

        self.shutdown_tx.send_replace(true);

        let monitor = match handle.await {
            Ok(monitor) => monitor,
            Err(e) => {
                error!(error = %e, "monitor task failed");
                self.lost = Some(e.to_string());
                return Err(MonitorError::Shutdown(format!("monitor task failed: {}", e)));
            }
        };
        self.monitor = Some(monitor);

        info!("monitor runtime stopped");
        Ok(())
    }

    /// Check if the monitor task is running.
    pub fn is_started(&self) -> bool {
        self.handle.is_some()
    }

    /// The idle monitor, if the runtime is not started.
    pub fn monitor(&self) -> Option<&TorrentMonitor> {
        self.monitor.as_ref()
    }
}

impl Drop for MonitorRuntime {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown_tx.send_replace(true);
        }
    }
}
