//! The notification seam.

use async_trait::async_trait;
use herald_models::{NotificationEvent, TorrentSnapshot};
use tokio::sync::mpsc;

use crate::error::{MonitorError, Result};

/// Delivers monitor output to the outside world.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one transition notification.
    async fn notify(&self, event: &NotificationEvent) -> Result<()>;

    /// Deliver a periodic digest of all known torrents.
    ///
    /// The default implementation ignores the digest.
    async fn status_report(&self, _torrents: &[TorrentSnapshot]) -> Result<()> {
        Ok(())
    }
}

/// A notifier that forwards events into an mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<NotificationEvent>,
}

impl ChannelNotifier {
    /// Creates a notifier and the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NotificationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, event: &NotificationEvent) -> Result<()> {
        self.tx
            .send(event.clone())
            .map_err(|_| MonitorError::Notify("event receiver dropped".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_models::{TorrentState, TransitionKind};

    fn event() -> NotificationEvent {
        let snapshot = TorrentSnapshot::new("t1", "Arch ISO", TorrentState::Completed);
        NotificationEvent::for_snapshot(&snapshot, TransitionKind::Completed)
    }

    #[tokio::test]
    async fn test_channel_notifier_forwards_events() {
        let (notifier, mut rx) = ChannelNotifier::channel();

        notifier.notify(&event()).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received, event());
    }

    #[tokio::test]
    async fn test_channel_notifier_fails_when_receiver_dropped() {
        let (notifier, rx) = ChannelNotifier::channel();
        drop(rx);

        let result = notifier.notify(&event()).await;
        assert!(matches!(result, Err(MonitorError::Notify(_))));
    }

    #[tokio::test]
    async fn test_default_status_report_is_noop() {
        let (notifier, _rx) = ChannelNotifier::channel();
        assert!(notifier.status_report(&[]).await.is_ok());
    }
}
