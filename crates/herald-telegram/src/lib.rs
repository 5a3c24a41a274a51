//! Telegram bot interface for Torrent Herald.
//!
//! The bot proxies chat commands to a qBittorrent Web UI and runs the torrent
//! monitor in the background, announcing finished and failed downloads in the
//! configured chats.
//!
//! # Commands
//!
//! - `/start` - Welcome message
//! - `/help` - Show available commands
//! - `/torrents` - List torrents grouped by state
//! - `/status` - Progress and speed of every torrent
//! - `/space` - Transfer speeds and free disk space
//! - `/search <query>` - Search Jackett for torrents, when configured
//!
//! Any plain message containing magnet links adds them to qBittorrent.
//!
//! # Example
//!
//! ```no_run
//! use herald_core::AppConfig;
//! use herald_telegram::HeraldBot;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let bot = HeraldBot::new(&config)?;
//!     bot.start_polling().await?;
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod error;
pub mod handlers;
pub mod notifier;
pub mod state;

pub use bot::HeraldBot;
pub use error::{Result, TelegramError};
pub use notifier::TelegramNotifier;
pub use state::{create_shared_state, BotState};
