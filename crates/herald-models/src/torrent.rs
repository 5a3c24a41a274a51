//! Torrent snapshot types.
//!
//! A [`TorrentSnapshot`] describes one torrent at one poll instant. Snapshots
//! are produced fresh on every poll of the torrent client and are never
//! persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::TorrentId;

/// Classified state of a torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TorrentState {
    /// Waiting in the download queue.
    Queued,
    /// Actively downloading (including stalled and metadata fetching).
    Downloading,
    /// Paused before completion.
    Paused,
    /// All data downloaded; seeding, paused after completion, or finished.
    Completed,
    /// The client reported an error for this torrent.
    Error,
    /// Any state the client reports that we do not recognize.
    #[default]
    Unknown,
}

impl TorrentState {
    /// Classify a raw qBittorrent state string.
    ///
    /// Unrecognized strings map to [`TorrentState::Unknown`].
    pub fn from_qbittorrent(raw: &str) -> Self {
        match raw {
            "downloading" | "stalledDL" | "metaDL" | "forcedMetaDL" | "forcedDL"
            | "checkingDL" | "allocating" => TorrentState::Downloading,
            "queuedDL" | "checkingResumeData" => TorrentState::Queued,
            "pausedDL" | "stoppedDL" => TorrentState::Paused,
            "uploading" | "stalledUP" | "forcedUP" | "checkingUP" | "queuedUP" | "pausedUP"
            | "stoppedUP" | "seeding" | "finished" => TorrentState::Completed,
            "error" | "missingFiles" => TorrentState::Error,
            _ => TorrentState::Unknown,
        }
    }

    /// Returns true for states that precede completion.
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self,
            TorrentState::Queued | TorrentState::Downloading | TorrentState::Paused
        )
    }

    /// Short lowercase label used in logs and chat messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            TorrentState::Queued => "queued",
            TorrentState::Downloading => "downloading",
            TorrentState::Paused => "paused",
            TorrentState::Completed => "completed",
            TorrentState::Error => "error",
            TorrentState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TorrentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full set of fields describing one torrent at one poll instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentSnapshot {
    /// Torrent identifier.
    pub id: TorrentId,
    /// Display name.
    pub name: String,
    /// Download progress in the range 0.0-1.0.
    pub progress: f64,
    /// Classified state.
    pub state: TorrentState,
    /// Raw state string as reported by the client.
    #[serde(default)]
    pub raw_state: String,
    /// Total size in bytes.
    pub size: u64,
    /// Download rate in bytes per second.
    pub download_rate: u64,
    /// Upload rate in bytes per second.
    #[serde(default)]
    pub upload_rate: u64,
}

impl TorrentSnapshot {
    /// Creates a snapshot with zeroed progress, size and rates.
    pub fn new(id: impl Into<TorrentId>, name: impl Into<String>, state: TorrentState) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            progress: 0.0,
            state,
            raw_state: state.as_str().to_string(),
            size: 0,
            download_rate: 0,
            upload_rate: 0,
        }
    }

    /// Sets the progress, clamped to 0.0-1.0.
    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = progress.clamp(0.0, 1.0);
        self
    }

    /// Sets the raw client state string.
    pub fn with_raw_state(mut self, raw: impl Into<String>) -> Self {
        self.raw_state = raw.into();
        self
    }

    /// Sets the total size in bytes.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Sets download and upload rates in bytes per second.
    pub fn with_rates(mut self, download: u64, upload: u64) -> Self {
        self.download_rate = download;
        self.upload_rate = upload;
        self
    }

    /// Progress as a percentage rounded to one decimal place.
    pub fn percent(&self) -> f64 {
        (self.progress * 1000.0).round() / 10.0
    }
}

/// Global transfer statistics of the torrent client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransferInfo {
    /// Global download speed in bytes per second.
    pub download_speed: u64,
    /// Global upload speed in bytes per second.
    pub upload_speed: u64,
    /// Free space on the download disk, when the client reports it.
    pub free_space: Option<u64>,
}
