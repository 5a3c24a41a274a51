//! Shared building blocks for Torrent Herald.
//!
//! - [`config`] - application settings read from the environment and env files
//! - [`format`] - chat message formatting and magnet link extraction

pub mod config;
pub mod format;

pub use config::{AppConfig, ConfigError, JackettSettings};
