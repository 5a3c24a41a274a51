//! Delivery of monitor notifications to Telegram chats.

use async_trait::async_trait;
use futures::future::join_all;
use herald_core::format::{
    format_notification, format_status_report, split_message, MAX_MESSAGE_CHARS,
};
use herald_models::{NotificationEvent, TorrentSnapshot};
use herald_monitor::{MonitorError, Notifier};
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{debug, warn};

/// Sends monitor output as HTML messages to every configured chat.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat_ids: Vec<ChatId>,
}

impl TelegramNotifier {
    /// Create a notifier for the given chats.
    pub fn new(bot: Bot, chat_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            bot,
            chat_ids: chat_ids.into_iter().map(ChatId).collect(),
        }
    }

    /// The chats that receive notifications.
    pub fn chat_ids(&self) -> &[ChatId] {
        &self.chat_ids
    }

    /// Send `text` to all chats. Every chat is attempted; the call fails if
    /// any send failed. Long texts go out as several messages.
    async fn broadcast(&self, text: &str) -> herald_monitor::Result<()> {
        let chunks = split_message(text, MAX_MESSAGE_CHARS);
        let chunks = &chunks;
        let sends = self.chat_ids.iter().map(|&chat_id| async move {
            for chunk in chunks {
                let sent = self
                    .bot
                    .send_message(chat_id, chunk.as_str())
                    .parse_mode(ParseMode::Html)
                    .await;
                if let Err(e) = sent {
                    return (chat_id, Err(e));
                }
            }
            (chat_id, Ok(()))
        });

        let mut failed = 0;
        for (chat_id, result) in join_all(sends).await {
            match result {
                Ok(_) => debug!(chat_id = %chat_id, "Notification sent"),
                Err(e) => {
                    warn!(chat_id = %chat_id, error = %e, "Failed to send notification");
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(MonitorError::Notify(format!(
                "{failed} of {} chats could not be reached",
                self.chat_ids.len()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, event: &NotificationEvent) -> herald_monitor::Result<()> {
        self.broadcast(&format_notification(event)).await
    }

    async fn status_report(&self, torrents: &[TorrentSnapshot]) -> herald_monitor::Result<()> {
        let text = format!(
            "{}\n\n<i>{}</i>",
            format_status_report(torrents),
            chrono::Local::now().format("%Y-%m-%d %H:%M")
        );
        self.broadcast(&text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_models::{TorrentState, TransitionKind};
    use httpmock::prelude::*;
    use serde_json::json;

    const TOKEN: &str = "123456:TEST";

    fn notifier(server: &MockServer, chats: Vec<i64>) -> TelegramNotifier {
        let api_url = url::Url::parse(&server.base_url()).unwrap();
        let bot = Bot::new(TOKEN).set_api_url(api_url);
        TelegramNotifier::new(bot, chats)
    }

    fn event() -> NotificationEvent {
        let snapshot = TorrentSnapshot::new("t1", "Fedora 40", TorrentState::Completed);
        NotificationEvent::for_snapshot(&snapshot, TransitionKind::Completed)
    }

    fn sent_message(chat_id: i64) -> serde_json::Value {
        json!({
            "ok": true,
            "result": {
                "message_id": 1,
                "date": 1700000000,
                "chat": {"id": chat_id, "type": "private", "first_name": "Test"},
                "text": "Download complete"
            }
        })
    }

    #[tokio::test]
    async fn test_notify_sends_to_every_chat() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(200).json_body(sent_message(1001));
        });

        let notifier = notifier(&server, vec![1001, 1002]);
        notifier.notify(&event()).await.unwrap();

        mock.assert_hits(2);
    }

    #[tokio::test]
    async fn test_notify_fails_when_a_chat_fails() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(400).json_body(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            }));
        });

        let notifier = notifier(&server, vec![1001, 1002]);
        let result = notifier.notify(&event()).await;

        assert!(matches!(result, Err(MonitorError::Notify(_))));
        mock.assert_hits(2);
    }

    #[tokio::test]
    async fn test_long_status_report_is_split() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(200).json_body(sent_message(1001));
        });

        let torrents: Vec<_> = (0..60)
            .map(|i| {
                TorrentSnapshot::new(
                    format!("hash{i}"),
                    format!("Some.Linux.Distribution.{i:02}.Release.2024.x86_64.DVD.Image.iso"),
                    TorrentState::Downloading,
                )
                .with_rates(1024 * 1024, 2048)
            })
            .collect();

        let notifier = notifier(&server, vec![1001]);
        notifier.status_report(&torrents).await.unwrap();

        mock.assert_hits(2);
    }

    #[test]
    fn test_chat_ids() {
        let notifier = TelegramNotifier::new(Bot::new(TOKEN), vec![1, -100]);
        assert_eq!(notifier.chat_ids(), &[ChatId(1), ChatId(-100)]);
    }
}
