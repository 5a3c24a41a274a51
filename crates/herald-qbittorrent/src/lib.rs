//! qBittorrent Web API client for Torrent Herald.
//!
//! Wraps the handful of v2 endpoints the bot needs: login, the torrent
//! listing, adding magnet links and global transfer statistics.
//! [`QbitClient`] also implements [`herald_monitor::TorrentSource`] so the
//! monitor can poll it directly.

pub mod client;
pub mod error;
pub mod model;

pub use client::{QbitClient, QbitConfig, DEFAULT_TIMEOUT};
pub use error::{QbitError, Result};
