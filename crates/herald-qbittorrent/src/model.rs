//! Wire types of the qBittorrent Web API v2.

use herald_models::{TorrentSnapshot, TorrentState};
use serde::Deserialize;

/// One entry of `GET /api/v2/torrents/info`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTorrent {
    pub hash: String,
    pub name: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub state: String,
    /// qBittorrent reports -1 while metadata is still unknown.
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub dlspeed: u64,
    #[serde(default)]
    pub upspeed: u64,
}

impl From<RawTorrent> for TorrentSnapshot {
    fn from(raw: RawTorrent) -> Self {
        let state = TorrentState::from_qbittorrent(&raw.state);
        TorrentSnapshot::new(raw.hash, raw.name, state)
            .with_raw_state(raw.state)
            .with_progress(raw.progress)
            .with_size(raw.size.max(0) as u64)
            .with_rates(raw.dlspeed, raw.upspeed)
    }
}

/// Body of `GET /api/v2/transfer/info`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransferInfo {
    #[serde(default)]
    pub dl_info_speed: u64,
    #[serde(default)]
    pub up_info_speed: u64,
}

/// Body of `GET /api/v2/sync/maindata`; only the part we read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMainData {
    #[serde(default)]
    pub server_state: Option<RawServerState>,
}

/// `server_state` object of the main data. Older Web API versions omit
/// `free_space_on_disk`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawServerState {
    #[serde(default)]
    pub free_space_on_disk: Option<u64>,
}
