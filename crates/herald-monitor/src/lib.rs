//! Torrent state change monitor for Torrent Herald.
//!
//! This crate watches a torrent client and reports the transitions users care
//! about:
//! - `TorrentMonitor` - polls a `TorrentSource`, diffs the listing against the
//!   last one and hands `NotificationEvent`s to a `Notifier`
//! - `MonitorState` - the last observed snapshot per torrent, owned by the monitor
//! - `MonitorRuntime` - runs the monitor on its own task with graceful shutdown
//!
//! # Example
//!
//! ```ignore
//! use herald_monitor::{ChannelNotifier, MonitorConfig, MonitorRuntime, TorrentMonitor};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = Arc::new(herald_qbittorrent::QbitClient::new(qbit_config)?);
//!     let (notifier, mut events) = ChannelNotifier::channel();
//!
//!     let monitor = TorrentMonitor::new(source, Arc::new(notifier), MonitorConfig::default());
//!     let mut runtime = MonitorRuntime::new(monitor);
//!     runtime.start()?;
//!
//!     tokio::spawn(async move {
//!         while let Some(event) = events.recv().await {
//!             println!("{} {}", event.name, event.kind);
//!         }
//!     });
//!
//!     tokio::signal::ctrl_c().await?;
//!     runtime.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Failure handling
//!
//! A poll never fails. Fetch failures (network, timeout, bad status, expired
//! authentication, malformed payload) leave the state as it was and the next
//! tick is the retry. Notifier failures are logged after the state has been
//! updated, so a transition is never reported twice.

pub mod config;
pub mod error;
pub mod monitor;
pub mod notifier;
pub mod runtime;
pub mod source;
pub mod state;

pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use monitor::{PollOutcome, TorrentMonitor};
pub use notifier::{ChannelNotifier, Notifier};
pub use runtime::MonitorRuntime;
pub use source::TorrentSource;
pub use state::{classify_transition, MonitorState, StateUpdate};
