//! Identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque torrent identifier (the info-hash reported by the torrent client).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TorrentId(String);

impl TorrentId {
    /// Creates an identifier from any string-like value.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TorrentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TorrentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TorrentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torrent_id_display() {
        let id = TorrentId::from_string("abc123");
        assert_eq!(id.to_string(), "abc123");
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn test_torrent_id_serializes_as_plain_string() {
        let id = TorrentId::from("deadbeef");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"deadbeef\"");

        let back: TorrentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
