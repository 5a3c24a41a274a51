//! Application configuration.
//!
//! Settings come from the process environment. Before reading them the
//! binary calls [`load_env_files`], which loads the user env file
//! (`~/.config/torrent-herald/herald.env`) and then a local `.env` or an
//! explicit file. Values already present in the environment are never
//! overridden.
//!
//! # Environment Variables
//!
//! - `TELEGRAM_BOT_TOKEN` (or `TG_TOKEN`): bot token, required
//! - `TELEGRAM_CHAT_ID` (or `TG_CHAT_ID`): comma-separated chats that receive
//!   notifications, required
//! - `AUTHORIZED_USERS`: comma-separated Telegram user ids; empty allows everyone
//! - `QB_URL`: qBittorrent Web UI URL, required
//! - `QB_USER` / `QB_PASS`: Web UI credentials
//! - `POLL_INTERVAL` (or `INTERVALO`): seconds between polls, default 60
//! - `QB_TIMEOUT`: request timeout in seconds, default 10
//! - `NOTIFY_ERRORS`: notify when a torrent enters the error state, default true
//! - `STATUS_INTERVAL`: seconds between status digests, 0 or unset disables
//! - `JACKETT_URL` / `JACKETT_API_KEY`: Jackett instance for `/search`; search
//!   is disabled unless both are set
//! - `JACKETT_INDEXERS`: comma-separated indexer ids, default all indexers
//! - `JACKETT_CATEGORIES`: comma-separated Torznab category ids

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";
pub const AUTHORIZED_USERS_ENV: &str = "AUTHORIZED_USERS";
pub const QB_URL_ENV: &str = "QB_URL";
pub const QB_USER_ENV: &str = "QB_USER";
pub const QB_PASS_ENV: &str = "QB_PASS";
pub const POLL_INTERVAL_ENV: &str = "POLL_INTERVAL";
pub const QB_TIMEOUT_ENV: &str = "QB_TIMEOUT";
pub const NOTIFY_ERRORS_ENV: &str = "NOTIFY_ERRORS";
pub const STATUS_INTERVAL_ENV: &str = "STATUS_INTERVAL";
pub const JACKETT_URL_ENV: &str = "JACKETT_URL";
pub const JACKETT_API_KEY_ENV: &str = "JACKETT_API_KEY";
pub const JACKETT_INDEXERS_ENV: &str = "JACKETT_INDEXERS";
pub const JACKETT_CATEGORIES_ENV: &str = "JACKETT_CATEGORIES";

// Older names still accepted.
const TOKEN_ALIAS: &str = "TG_TOKEN";
const CHAT_ID_ALIAS: &str = "TG_CHAT_ID";
const POLL_INTERVAL_ALIAS: &str = "INTERVALO";

const DEFAULT_POLL_SECS: u64 = 60;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const APP_DIR: &str = "torrent-herald";
const USER_ENV_FILE: &str = "herald.env";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// An env file exists but could not be loaded.
    #[error("failed to load env file {path}: {message}")]
    EnvFile { path: PathBuf, message: String },
}

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Where `/search` sends its queries.
#[derive(Debug, Clone, PartialEq)]
pub struct JackettSettings {
    pub url: String,
    pub api_key: String,
    /// Indexer ids to query; empty means Jackett's aggregate `all` indexer.
    pub indexers: Vec<String>,
    pub categories: Vec<u32>,
}

/// Everything the bot needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub telegram_token: String,
    /// Chats that receive monitor notifications.
    pub notify_chat_ids: Vec<i64>,
    /// Users allowed to run privileged commands. Empty allows everyone.
    pub authorized_users: Vec<u64>,
    pub qb_url: String,
    pub qb_user: Option<String>,
    pub qb_pass: Option<String>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub notify_errors: bool,
    /// Interval of the periodic status digest, if enabled.
    pub status_interval: Option<Duration>,
    /// Jackett search, if configured.
    pub jackett: Option<JackettSettings>,
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which returns the raw value of
    /// a variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let get_aliased = |key: &str, alias: &str| get(key).or_else(|| get(alias));

        let telegram_token = get_aliased(TOKEN_ENV, TOKEN_ALIAS).ok_or(ConfigError::Missing(TOKEN_ENV))?;

        let chat_ids = get_aliased(CHAT_ID_ENV, CHAT_ID_ALIAS).ok_or(ConfigError::Missing(CHAT_ID_ENV))?;
        let notify_chat_ids: Vec<i64> = parse_list(CHAT_ID_ENV, &chat_ids)?;
        if notify_chat_ids.is_empty() {
            return Err(ConfigError::Missing(CHAT_ID_ENV));
        }

        let authorized_users = match get(AUTHORIZED_USERS_ENV) {
            Some(raw) => parse_list(AUTHORIZED_USERS_ENV, &raw)?,
            None => Vec::new(),
        };

        let qb_url = get(QB_URL_ENV).ok_or(ConfigError::Missing(QB_URL_ENV))?;

        let poll_secs = match get_aliased(POLL_INTERVAL_ENV, POLL_INTERVAL_ALIAS) {
            Some(raw) => parse_secs(POLL_INTERVAL_ENV, &raw)?,
            None => DEFAULT_POLL_SECS,
        };
        if poll_secs == 0 {
            return Err(ConfigError::Invalid {
                name: POLL_INTERVAL_ENV,
                value: poll_secs.to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        let timeout_secs = match get(QB_TIMEOUT_ENV) {
            Some(raw) => parse_secs(QB_TIMEOUT_ENV, &raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let notify_errors = match get(NOTIFY_ERRORS_ENV) {
            Some(raw) => parse_bool(NOTIFY_ERRORS_ENV, &raw)?,
            None => true,
        };

        let status_interval = match get(STATUS_INTERVAL_ENV) {
            Some(raw) => Some(parse_secs(STATUS_INTERVAL_ENV, &raw)?)
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            None => None,
        };

        let jackett = match (get(JACKETT_URL_ENV), get(JACKETT_API_KEY_ENV)) {
            (Some(url), Some(api_key)) => Some(JackettSettings {
                url,
                api_key,
                indexers: match get(JACKETT_INDEXERS_ENV) {
                    Some(raw) => parse_list(JACKETT_INDEXERS_ENV, &raw)?,
                    None => Vec::new(),
                },
                categories: match get(JACKETT_CATEGORIES_ENV) {
                    Some(raw) => parse_list(JACKETT_CATEGORIES_ENV, &raw)?,
                    None => Vec::new(),
                },
            }),
            (Some(_), None) | (None, Some(_)) => {
                warn!("JACKETT_URL and JACKETT_API_KEY must both be set, search disabled");
                None
            }
            (None, None) => None,
        };

        Ok(Self {
            telegram_token,
            notify_chat_ids,
            authorized_users,
            qb_url,
            qb_user: get(QB_USER_ENV),
            qb_pass: get(QB_PASS_ENV),
            poll_interval: Duration::from_secs(poll_secs),
            request_timeout: Duration::from_secs(timeout_secs),
            notify_errors,
            status_interval,
            jackett,
        })
    }
}

fn parse_list<T>(name: &'static str, raw: &str) -> Result<Vec<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                value: s.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

fn parse_secs(name: &'static str, raw: &str) -> Result<u64> {
    raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a boolean flag: `1/0`, `true/false`, `yes/no`, `on/off`.
pub fn parse_bool(name: &'static str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

/// Path of the per-user env file, `~/.config/torrent-herald/herald.env`.
pub fn user_env_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(USER_ENV_FILE))
}

/// Load a single env file. Missing files are skipped; returns whether the
/// file was loaded.
pub fn load_env_file(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    dotenvy::from_path(path).map_err(|e| ConfigError::EnvFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(path = %path.display(), "loaded env file");
    Ok(true)
}

/// Load the user env file, then `explicit` if given or `.env` otherwise.
///
/// An explicit file that does not exist is an error; the implicit ones are
/// optional.
pub fn load_env_files(explicit: Option<&Path>) -> Result<()> {
    if let Some(path) = user_env_file() {
        load_env_file(&path)?;
    }

    match explicit {
        Some(path) => {
            if !load_env_file(path)? {
                return Err(ConfigError::EnvFile {
                    path: path.to_path_buf(),
                    message: "file not found".to_string(),
                });
            }
        }
        None => {
            load_env_file(Path::new(".env"))?;
        }
    }
    Ok(())
}
