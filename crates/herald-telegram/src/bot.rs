//! Main Telegram bot implementation.

use std::sync::Arc;

use herald_core::AppConfig;
use herald_jackett::{JackettClient, JackettConfig};
use herald_monitor::{MonitorConfig, MonitorRuntime, TorrentMonitor, TorrentSource};
use herald_qbittorrent::{QbitClient, QbitConfig};
use teloxide::prelude::*;
use tracing::{info, warn};

use crate::error::{Result, TelegramError};
use crate::handlers::{handle_command, handle_message, handle_unknown, Command};
use crate::notifier::TelegramNotifier;
use crate::state::{create_shared_state, BotState};

/// The Telegram bot for Torrent Herald.
pub struct HeraldBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Shared state across handlers.
    state: Arc<BotState>,
    /// qBittorrent client, shared by the handlers and the monitor.
    qbit: Arc<QbitClient>,
    /// Monitor settings.
    monitor_config: MonitorConfig,
    /// Chats that receive monitor notifications.
    notify_chat_ids: Vec<i64>,
}

impl HeraldBot {
    /// Create the bot from the application config. No network calls are made.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut qbit_config = QbitConfig::new(&config.qb_url)?.with_timeout(config.request_timeout);
        if let Some(user) = &config.qb_user {
            qbit_config = qbit_config.with_credentials(user, config.qb_pass.clone().unwrap_or_default());
        }
        let qbit = Arc::new(QbitClient::new(qbit_config)?);

        let jackett = match &config.jackett {
            Some(settings) => {
                let jackett_config = JackettConfig::new(&settings.url, settings.api_key.clone())?
                    .with_indexers(settings.indexers.clone())
                    .with_categories(settings.categories.clone());
                Some(Arc::new(JackettClient::new(jackett_config)?))
            }
            None => {
                info!("Jackett not configured, /search disabled");
                None
            }
        };

        let monitor_config = MonitorConfig::new()
            .with_poll_interval(config.poll_interval)
            .with_request_timeout(config.request_timeout)
            .with_notify_errors(config.notify_errors)
            .with_status_interval(config.status_interval);

        Ok(Self {
            bot: Bot::new(&config.telegram_token),
            state: create_shared_state(Arc::clone(&qbit), jackett, config),
            qbit,
            monitor_config,
            notify_chat_ids: config.notify_chat_ids.clone(),
        })
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// The qBittorrent client.
    pub fn qbit(&self) -> &QbitClient {
        &self.qbit
    }

    /// Build the torrent monitor that reports to the notification chats.
    fn build_monitor(&self) -> TorrentMonitor {
        let source: Arc<dyn TorrentSource> = self.qbit.clone();
        let notifier = TelegramNotifier::new(self.bot.clone(), self.notify_chat_ids.iter().copied());
        TorrentMonitor::new(source, Arc::new(notifier), self.monitor_config.clone())
    }

    /// Run the monitor and dispatch updates in polling mode until Ctrl+C.
    pub async fn start_polling(&self) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");

        let mut monitor = MonitorRuntime::new(self.build_monitor());
        monitor.start()?;
        info!(
            poll_interval_secs = self.monitor_config.poll_interval.as_secs(),
            chats = self.notify_chat_ids.len(),
            "Torrent monitor running"
        );

        let state_for_commands = Arc::clone(&self.state);
        let state_for_messages = Arc::clone(&self.state);

        let handler = dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let state = Arc::clone(&state_for_commands);
                        info!(chat_id = %msg.chat.id, "Command matched: {:?}", cmd);
                        async move { handle_command(bot, msg, cmd, state).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.text().is_some_and(|t| t.starts_with('/')))
                    .endpoint(handle_unknown),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.text().is_some_and(|t| !t.starts_with('/')))
                    .endpoint(move |bot: Bot, msg: Message| {
                        let state = Arc::clone(&state_for_messages);
                        async move { handle_message(bot, msg, state).await }
                    }),
            );

        info!("Bot is running! Send /start to begin.");

        Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|upd| async move {
                warn!("Unhandled update: {:?}", upd.kind);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        monitor.shutdown().await?;
        info!("Bot stopped");
        Ok(())
    }
}
