//! Last-known torrent state and the transition table.
//!
//! Each torrent identifier moves through
//! `unseen -> {queued, downloading, paused, completed, error, unknown} -> absent`.
//! [`classify_transition`] decides which of those moves are worth telling the
//! user about; [`MonitorState::apply`] runs it over a fresh listing.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use herald_models::{NotificationEvent, TorrentId, TorrentSnapshot, TorrentState, TransitionKind};
use tracing::{debug, trace};

/// Classify the move from `prev` (`None` when the torrent was unseen) to `next`.
///
/// Only two kinds of move are reported:
/// - queued/downloading/paused -> completed
/// - any other state, including unseen, -> error (when `notify_errors` is set)
///
/// A torrent first seen as completed is silent because no transition was
/// observed. The state is authoritative; progress is never consulted.
pub fn classify_transition(
    prev: Option<TorrentState>,
    next: TorrentState,
    notify_errors: bool,
) -> Option<TransitionKind> {
    if prev == Some(next) {
        return None;
    }

    match (prev, next) {
        (Some(prev), TorrentState::Completed) if prev.is_incomplete() => {
            Some(TransitionKind::Completed)
        }
        (_, TorrentState::Error) if notify_errors => Some(TransitionKind::Error),
        _ => None,
    }
}

/// Result of applying one fresh listing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StateUpdate {
    /// Notifications to dispatch, in listing order.
    pub events: Vec<NotificationEvent>,
    /// Number of identifiers seen for the first time.
    pub added: usize,
    /// Number of identifiers dropped because they left the listing.
    pub removed: usize,
}

/// Mapping from torrent identifier to its last observed snapshot.
///
/// Owned by a single monitor; never shared between tasks.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MonitorState {
    torrents: HashMap<TorrentId, TorrentSnapshot>,
    /// Last state other than `Unknown` for each tracked torrent.
    settled: HashMap<TorrentId, TorrentState>,
}

impl MonitorState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked torrents.
    pub fn len(&self) -> usize {
        self.torrents.len()
    }

    /// Returns true if no torrent is tracked.
    pub fn is_empty(&self) -> bool {
        self.torrents.is_empty()
    }

    /// Last observed snapshot for `id`.
    pub fn get(&self, id: &TorrentId) -> Option<&TorrentSnapshot> {
        self.torrents.get(id)
    }

    /// Copy of all tracked snapshots, sorted by name then identifier.
    pub fn snapshot(&self) -> Vec<TorrentSnapshot> {
        let mut torrents: Vec<_> = self.torrents.values().cloned().collect();
        torrents.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        torrents
    }

    /// State a new observation is classified against.
    ///
    /// A torrent passing through `Unknown` (qBittorrent's `moving`, or a
    /// state this version does not know) is compared with the state it had
    /// before, so `downloading -> moving -> stalledUP` still completes.
    fn previous_state(&self, id: &TorrentId) -> Option<TorrentState> {
        match self.torrents.get(id).map(|s| s.state) {
            Some(TorrentState::Unknown) => self
                .settled
                .get(id)
                .copied()
                .or(Some(TorrentState::Unknown)),
            other => other,
        }
    }

    /// Replace the state with a freshly fetched listing and return the
    /// transitions it implies.
    ///
    /// Every listed torrent ends up stored regardless of whether it produced
    /// a notification. Torrents missing from the listing are dropped silently.
    /// If the listing contains the same identifier twice, the last entry wins.
    pub fn apply(&mut self, fresh: Vec<TorrentSnapshot>, notify_errors: bool) -> StateUpdate {
        let mut next: HashMap<TorrentId, TorrentSnapshot> = HashMap::with_capacity(fresh.len());
        let mut order: Vec<TorrentId> = Vec::with_capacity(fresh.len());

        for snapshot in fresh {
            match next.entry(snapshot.id.clone()) {
                Entry::Occupied(mut slot) => {
                    debug!(torrent_id = %snapshot.id, "duplicate torrent in listing, keeping last entry");
                    slot.insert(snapshot);
                }
                Entry::Vacant(slot) => {
                    order.push(snapshot.id.clone());
                    slot.insert(snapshot);
                }
            }
        }

        let mut update = StateUpdate::default();
        let mut settled = HashMap::with_capacity(order.len());

        for id in &order {
            let current = &next[id];
            let stored = self.torrents.get(id).map(|s| s.state);

            if stored.is_none() {
                update.added += 1;
            } else if stored != Some(current.state) {
                trace!(
                    torrent_id = %id,
                    from = ?stored,
                    to = %current.state,
                    "torrent state changed"
                );
            }

            let prev = self.previous_state(id);
            if let Some(kind) = classify_transition(prev, current.state, notify_errors) {
                update.events.push(NotificationEvent::for_snapshot(current, kind));
            }

            let last_settled = if current.state == TorrentState::Unknown {
                self.settled.get(id).copied()
            } else {
                Some(current.state)
            };
            if let Some(state) = last_settled {
                settled.insert(id.clone(), state);
            }
        }

        update.removed = self
            .torrents
            .keys()
            .filter(|id| !next.contains_key(*id))
            .count();

        self.torrents = next;
        self.settled = settled;
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use herald_models::TorrentState::*;

    fn snap(id: &str, state: TorrentState, progress: f64) -> TorrentSnapshot {
        TorrentSnapshot::new(id, format!("torrent {id}"), state).with_progress(progress)
    }

    #[test]
    fn test_transition_table_completion() {
        for prev in [Queued, Downloading, Paused] {
            assert_eq!(
                classify_transition(Some(prev), Completed, true),
                Some(TransitionKind::Completed),
                "{prev} -> completed"
            );
        }
        assert_eq!(classify_transition(Some(Unknown), Completed, true), None);
        assert_eq!(classify_transition(Some(Error), Completed, true), None);
        assert_eq!(classify_transition(Some(Completed), Completed, true), None);
        assert_eq!(classify_transition(None, Completed, true), None);
    }

    #[test]
    fn test_transition_table_error() {
        for prev in [None, Some(Queued), Some(Downloading), Some(Paused), Some(Completed), Some(Unknown)] {
            assert_eq!(
                classify_transition(prev, Error, true),
                Some(TransitionKind::Error),
                "{prev:?} -> error"
            );
            assert_eq!(classify_transition(prev, Error, false), None);
        }
        assert_eq!(classify_transition(Some(Error), Error, true), None);
    }

    #[test]
    fn test_transition_table_silent_moves() {
        let states = [Queued, Downloading, Paused, Completed, Error, Unknown];
        for next in [Queued, Downloading, Paused, Unknown] {
            assert_eq!(classify_transition(None, next, true), None);
            for prev in states {
                assert_eq!(
                    classify_transition(Some(prev), next, true),
                    None,
                    "{prev} -> {next}"
                );
            }
        }
    }

    #[test]
    fn test_completion_after_download() {
        let mut state = MonitorState::new();

        let first = state.apply(vec![snap("t1", Downloading, 0.5)], true);
        assert!(first.events.is_empty());
        assert_eq!(first.added, 1);

        let second = state.apply(vec![snap("t1", Completed, 1.0)], true);
        assert_eq!(second.events.len(), 1);
        assert_eq!(second.events[0].torrent_id.as_str(), "t1");
        assert_eq!(second.events[0].kind, TransitionKind::Completed);
    }

    #[test]
    fn test_no_duplicate_completion() {
        let mut state = MonitorState::new();
        state.apply(vec![snap("t1", Downloading, 0.9)], true);

        let mut total = 0;
        for _ in 0..5 {
            total += state.apply(vec![snap("t1", Completed, 1.0)], true).events.len();
        }
        assert_eq!(total, 1);
    }

    #[test]
    fn test_first_sighting_completed_is_silent() {
        let mut state = MonitorState::new();
        let update = state.apply(vec![snap("t1", Completed, 1.0)], true);

        assert!(update.events.is_empty());
        assert_eq!(state.get(&TorrentId::from("t1")).unwrap().state, Completed);
    }

    #[test]
    fn test_removal_is_silent() {
        let mut state = MonitorState::new();
        state.apply(vec![snap("t1", Downloading, 0.1), snap("t2", Downloading, 0.2)], true);

        let update = state.apply(vec![snap("t2", Downloading, 0.3)], true);

        assert!(update.events.is_empty());
        assert_eq!(update.removed, 1);
        assert!(state.get(&TorrentId::from("t1")).is_none());
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_progress_lag_immunity() {
        let mut state = MonitorState::new();
        state.apply(vec![snap("t1", Downloading, 0.5)], true);

        let lagging = state.apply(vec![snap("t1", Downloading, 1.0)], true);
        assert!(lagging.events.is_empty());

        let flipped = state.apply(vec![snap("t1", Completed, 1.0)], true);
        assert_eq!(flipped.events.len(), 1);
    }

    #[test]
    fn test_error_notification_toggle() {
        let mut enabled = MonitorState::new();
        let update = enabled.apply(vec![snap("t2", Error, 0.1)], true);
        assert_eq!(update.events.len(), 1);
        assert_eq!(update.events[0].kind, TransitionKind::Error);

        let mut disabled = MonitorState::new();
        let update = disabled.apply(vec![snap("t2", Error, 0.1)], false);
        assert!(update.events.is_empty());
    }

    #[test]
    fn test_error_not_repeated_while_in_error() {
        let mut state = MonitorState::new();
        state.apply(vec![snap("t2", Downloading, 0.1)], true);

        assert_eq!(state.apply(vec![snap("t2", Error, 0.1)], true).events.len(), 1);
        assert!(state.apply(vec![snap("t2", Error, 0.1)], true).events.is_empty());
    }

    #[test]
    fn test_completion_after_reappearance_is_new_transition() {
        let mut state = MonitorState::new();
        state.apply(vec![snap("t1", Downloading, 0.5)], true);
        assert_eq!(state.apply(vec![snap("t1", Completed, 1.0)], true).events.len(), 1);

        // Re-checked torrents go back to downloading and complete again.
        assert!(state.apply(vec![snap("t1", Downloading, 0.9)], true).events.is_empty());
        assert_eq!(state.apply(vec![snap("t1", Completed, 1.0)], true).events.len(), 1);
    }

    #[test]
    fn test_completion_through_moving_state() {
        let mut state = MonitorState::new();

        let mut total = 0;
        let mut kinds = Vec::new();
        for raw in ["downloading", "moving", "stalledUP", "stalledUP"] {
            let snapshot = TorrentSnapshot::new("t1", "Fedora", TorrentState::from_qbittorrent(raw));
            let update = state.apply(vec![snapshot], true);
            total += update.events.len();
            kinds.extend(update.events.into_iter().map(|e| e.kind));
        }

        assert_eq!(total, 1);
        assert_eq!(kinds, vec![TransitionKind::Completed]);
    }

    #[test]
    fn test_unknown_between_completed_is_silent() {
        let mut state = MonitorState::new();
        state.apply(vec![snap("t1", Downloading, 0.5)], true);
        assert_eq!(state.apply(vec![snap("t1", Completed, 1.0)], true).events.len(), 1);

        assert!(state.apply(vec![snap("t1", Unknown, 1.0)], true).events.is_empty());
        assert!(state.apply(vec![snap("t1", Completed, 1.0)], true).events.is_empty());
    }

    #[test]
    fn test_first_sighting_unknown_then_completed_is_silent() {
        let mut state = MonitorState::new();
        state.apply(vec![snap("t1", Unknown, 1.0)], true);

        assert!(state.apply(vec![snap("t1", Completed, 1.0)], true).events.is_empty());
    }

    #[test]
    fn test_settled_state_dropped_with_torrent() {
        let mut state = MonitorState::new();
        state.apply(vec![snap("t1", Downloading, 0.5)], true);
        state.apply(vec![], true);

        // Re-added while moving: the old download must not count.
        state.apply(vec![snap("t1", Unknown, 1.0)], true);
        assert!(state.apply(vec![snap("t1", Completed, 1.0)], true).events.is_empty());
    }

    #[test]
    fn test_duplicate_identifier_last_wins() {
        let mut state = MonitorState::new();
        state.apply(vec![snap("t1", Downloading, 0.5)], true);

        let update = state.apply(
            vec![snap("t1", Downloading, 0.6), snap("t1", Completed, 1.0)],
            true,
        );

        assert_eq!(update.events.len(), 1);
        assert_eq!(state.len(), 1);
        assert_eq!(state.get(&TorrentId::from("t1")).unwrap().state, Completed);
    }

    #[test]
    fn test_snapshot_is_sorted_copy() {
        let mut state = MonitorState::new();
        state.apply(
            vec![
                TorrentSnapshot::new("b", "Zulu", Downloading),
                TorrentSnapshot::new("a", "Alpha", Completed),
            ],
            true,
        );

        let names: Vec<_> = state.snapshot().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Alpha", "Zulu"]);
    }
}
