//! Error types for the Telegram bot.

use thiserror::Error;

/// Errors that can occur in the Telegram bot.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] herald_core::ConfigError),

    /// qBittorrent client error.
    #[error("qBittorrent error: {0}")]
    Qbit(#[from] herald_qbittorrent::QbitError),

    /// Jackett client error.
    #[error("Jackett error: {0}")]
    Jackett(#[from] herald_jackett::JackettError),

    /// Torrent monitor error.
    #[error("Monitor error: {0}")]
    Monitor(#[from] herald_monitor::MonitorError),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;
