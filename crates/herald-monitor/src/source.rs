//! The torrent listing seam.

use async_trait::async_trait;
use herald_models::TorrentSnapshot;

use crate::error::Result;

/// A source of torrent snapshots, typically a torrent client's web API.
///
/// Implementations report every failure (network, timeout, non-2xx status,
/// expired authentication, malformed payload) as
/// [`MonitorError::Fetch`](crate::MonitorError::Fetch); the monitor treats
/// them all the same way.
#[async_trait]
pub trait TorrentSource: Send + Sync {
    /// Fetch the current list of torrents.
    async fn list_torrents(&self) -> Result<Vec<TorrentSnapshot>>;
}
