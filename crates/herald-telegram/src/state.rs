//! State shared by the command handlers.

use std::sync::Arc;

use herald_core::AppConfig;
use herald_jackett::JackettClient;
use herald_qbittorrent::QbitClient;
use teloxide::types::Message;

/// Handler state: the qBittorrent client, the optional search client and the
/// user allow-list.
pub struct BotState {
    qbit: Arc<QbitClient>,
    jackett: Option<Arc<JackettClient>>,
    authorized_users: Vec<u64>,
}

impl BotState {
    /// State that lets everyone in and has search disabled.
    pub fn new(qbit: Arc<QbitClient>) -> Self {
        Self {
            qbit,
            jackett: None,
            authorized_users: Vec::new(),
        }
    }

    /// Replace the allow-list.
    pub fn with_authorized_users(mut self, users: Vec<u64>) -> Self {
        self.authorized_users = users;
        self
    }

    /// Enable `/search` through `jackett`.
    pub fn with_jackett(mut self, jackett: Option<Arc<JackettClient>>) -> Self {
        self.jackett = jackett;
        self
    }

    /// The qBittorrent client.
    pub fn qbit(&self) -> &QbitClient {
        &self.qbit
    }

    /// The Jackett client, if search is configured.
    pub fn jackett(&self) -> Option<&JackettClient> {
        self.jackett.as_deref()
    }

    /// Returns true if `user_id` may run privileged commands.
    ///
    /// An empty allow-list lets everyone in.
    pub fn is_authorized(&self, user_id: u64) -> bool {
        self.authorized_users.is_empty() || self.authorized_users.contains(&user_id)
    }

    /// Authorization check for the sender of `msg`.
    ///
    /// Messages without a sender (channel posts) are only accepted when the
    /// allow-list is empty.
    pub fn is_authorized_message(&self, msg: &Message) -> bool {
        match msg.from.as_ref() {
            Some(user) => self.is_authorized(user.id.0),
            None => self.authorized_users.is_empty(),
        }
    }
}

/// Create shared handler state from the application config.
pub fn create_shared_state(
    qbit: Arc<QbitClient>,
    jackett: Option<Arc<JackettClient>>,
    config: &AppConfig,
) -> Arc<BotState> {
    Arc::new(
        BotState::new(qbit)
            .with_authorized_users(config.authorized_users.clone())
            .with_jackett(jackett),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_qbittorrent::QbitConfig;
    use serde_json::json;

    fn state(users: Vec<u64>) -> BotState {
        let client = QbitClient::new(QbitConfig::new("http://localhost:8080").unwrap()).unwrap();
        BotState::new(Arc::new(client)).with_authorized_users(users)
    }

    fn private_message(user_id: u64) -> Message {
        serde_json::from_value(json!({
            "message_id": 1,
            "date": 1700000000,
            "chat": {"id": user_id, "type": "private", "first_name": "Test"},
            "from": {"id": user_id, "is_bot": false, "first_name": "Test"},
            "text": "hello"
        }))
        .unwrap()
    }

    fn channel_post() -> Message {
        serde_json::from_value(json!({
            "message_id": 2,
            "date": 1700000000,
            "chat": {"id": -1001234567890i64, "type": "channel", "title": "Downloads"},
            "text": "hello"
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_allow_list_allows_everyone() {
        let state = state(vec![]);
        assert!(state.is_authorized(1));
        assert!(state.is_authorized(987654321));
    }

    #[test]
    fn test_allow_list() {
        let state = state(vec![42, 7]);
        assert!(state.is_authorized(42));
        assert!(state.is_authorized(7));
        assert!(!state.is_authorized(8));
    }

    #[test]
    fn test_message_sender_checked_against_allow_list() {
        let state = state(vec![42]);
        assert!(state.is_authorized_message(&private_message(42)));
        assert!(!state.is_authorized_message(&private_message(8)));
    }

    #[test]
    fn test_message_without_sender() {
        let post = channel_post();
        assert!(post.from.is_none());

        assert!(!state(vec![42]).is_authorized_message(&post));
        assert!(state(vec![]).is_authorized_message(&post));
    }

    #[test]
    fn test_search_disabled_by_default() {
        assert!(state(vec![]).jackett().is_none());
    }
}
