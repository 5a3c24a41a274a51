//! Notification events emitted by the torrent monitor.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::TorrentId;
use crate::torrent::TorrentSnapshot;

/// Kind of a user-relevant state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// The torrent finished downloading.
    Completed,
    /// The torrent entered the error state.
    Error,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionKind::Completed => f.write_str("completed"),
            TransitionKind::Error => f.write_str("error"),
        }
    }
}

/// A notification about one torrent transition.
///
/// Constructed by the monitor and immediately handed to a notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Torrent identifier.
    pub torrent_id: TorrentId,
    /// Torrent display name at the time of the transition.
    pub name: String,
    /// What happened.
    pub kind: TransitionKind,
}

impl NotificationEvent {
    /// Creates an event for the given snapshot.
    pub fn for_snapshot(snapshot: &TorrentSnapshot, kind: TransitionKind) -> Self {
        Self {
            torrent_id: snapshot.id.clone(),
            name: snapshot.name.clone(),
            kind,
        }
    }

    /// Returns true if this is a completion event.
    pub fn is_completion(&self) -> bool {
        self.kind == TransitionKind::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::torrent::TorrentState;

    #[test]
    fn test_event_for_snapshot() {
        let snapshot = TorrentSnapshot::new("t1", "Debian", TorrentState::Completed);
        let event = NotificationEvent::for_snapshot(&snapshot, TransitionKind::Completed);

        assert_eq!(event.torrent_id, TorrentId::from("t1"));
        assert_eq!(event.name, "Debian");
        assert!(event.is_completion());
    }

    #[test]
    fn test_transition_kind_display() {
        assert_eq!(TransitionKind::Completed.to_string(), "completed");
        assert_eq!(TransitionKind::Error.to_string(), "error");
    }
}
