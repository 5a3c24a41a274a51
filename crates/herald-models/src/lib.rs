//! Core data models for Torrent Herald.
//!
//! This crate provides the fundamental data types shared by the qBittorrent
//! client, the torrent monitor and the Telegram bot: torrent snapshots,
//! classified torrent states, the notification events emitted when a
//! torrent changes state and torrent search results.

pub mod event;
pub mod ids;
pub mod search;
pub mod torrent;

// Re-export main types
pub use event::{NotificationEvent, TransitionKind};
pub use ids::TorrentId;
pub use search::SearchResult;
pub use torrent::{TorrentSnapshot, TorrentState, TransferInfo};
