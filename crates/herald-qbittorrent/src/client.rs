//! HTTP client for the qBittorrent Web API v2.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use herald_models::{TorrentSnapshot, TransferInfo};
use herald_monitor::{MonitorError, TorrentSource};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{QbitError, Result};
use crate::model::{RawMainData, RawTorrent, RawTransferInfo};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const LOGIN_OK: &str = "Ok.";
const ADD_FAILED: &str = "Fails.";

/// Connection settings for a qBittorrent instance.
#[derive(Debug, Clone)]
pub struct QbitConfig {
    /// Base URL of the Web UI, e.g. `http://localhost:8080`.
    pub base_url: Url,
    /// Web UI user. Login is skipped when unset.
    pub username: Option<String>,
    /// Web UI password.
    pub password: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl QbitConfig {
    /// Parse `base_url` and build a config without credentials.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url.trim()).map_err(|e| QbitError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(QbitError::InvalidUrl(format!(
                "{base_url}: unsupported scheme {}",
                base_url.scheme()
            )));
        }

        Ok(Self {
            base_url,
            username: None,
            password: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set the Web UI credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for one qBittorrent instance.
///
/// The session cookie lives in reqwest's cookie store. A 403 from any
/// endpoint marks the session as expired; the next call logs in again.
pub struct QbitClient {
    http: Client,
    config: QbitConfig,
    logged_in: AtomicBool,
}

impl QbitClient {
    /// Build a client. No request is made until the first call.
    pub fn new(config: QbitConfig) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            logged_in: AtomicBool::new(false),
        })
    }

    /// The connection settings.
    pub fn config(&self) -> &QbitConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/v2/{}",
            self.config.base_url.as_str().trim_end_matches('/'),
            path
        )
    }

    /// Authenticate against `/api/v2/auth/login`.
    ///
    /// qBittorrent answers 200 with a body of `Ok.` on success and `Fails.`
    /// on bad credentials.
    pub async fn login(&self) -> Result<()> {
        let Some(username) = self.config.username.as_deref() else {
            debug!("no qBittorrent user configured, skipping login");
            self.logged_in.store(true, Ordering::SeqCst);
            return Ok(());
        };
        let password = self.config.password.as_deref().unwrap_or_default();

        let url = self.endpoint("auth/login");
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::REFERER, self.config.base_url.as_str())
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        if response.status() == StatusCode::FORBIDDEN {
            warn!("qBittorrent refused login, the client IP may be banned");
            return Err(QbitError::LoginRejected);
        }
        let response = check_status(response, "auth/login")?;
        let body = response.text().await?;

        if body.trim() != LOGIN_OK {
            warn!(user = %username, "qBittorrent login failed");
            return Err(QbitError::LoginRejected);
        }

        self.logged_in.store(true, Ordering::SeqCst);
        info!(user = %username, "logged in to qBittorrent");
        Ok(())
    }

    async fn ensure_logged_in(&self) -> Result<()> {
        if self.logged_in.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.login().await
    }

    /// Send an authenticated request and check its status.
    async fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<Response> {
        self.ensure_logged_in().await?;
        let response = request.send().await?;

        if response.status() == StatusCode::FORBIDDEN {
            self.logged_in.store(false, Ordering::SeqCst);
            warn!(endpoint, "qBittorrent session expired");
            return Err(QbitError::AuthExpired);
        }
        check_status(response, endpoint)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.http.get(self.endpoint(path)), path).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| QbitError::Parse {
            endpoint: path.to_string(),
            message: e.to_string(),
        })
    }

    /// List all torrents.
    pub async fn list_torrents(&self) -> Result<Vec<TorrentSnapshot>> {
        let raw: Vec<RawTorrent> = self.get_json("torrents/info").await?;
        debug!(count = raw.len(), "fetched torrent list");
        Ok(raw.into_iter().map(TorrentSnapshot::from).collect())
    }

    /// Queue a magnet link for download.
    pub async fn add_magnet(&self, magnet: &str) -> Result<()> {
        let request = self
            .http
            .post(self.endpoint("torrents/add"))
            .form(&[("urls", magnet)]);
        let response = self.send(request, "torrents/add").await?;
        let body = response.text().await?;

        if body.trim() == ADD_FAILED {
            return Err(QbitError::Rejected("torrent could not be added".to_string()));
        }

        info!("magnet link added");
        Ok(())
    }

    /// Global transfer rates plus free disk space when the server reports it.
    ///
    /// Free space comes from `/sync/maindata`; older Web API versions do not
    /// report it and a failure there is not fatal.
    pub async fn transfer_info(&self) -> Result<TransferInfo> {
        let raw: RawTransferInfo = self.get_json("transfer/info").await?;

        let free_space = match self.get_json::<RawMainData>("sync/maindata").await {
            Ok(data) => data.server_state.and_then(|s| s.free_space_on_disk),
            Err(QbitError::AuthExpired) => return Err(QbitError::AuthExpired),
            Err(e) => {
                debug!(error = %e, "free disk space unavailable");
                None
            }
        };

        Ok(TransferInfo {
            download_speed: raw.dl_info_speed,
            upload_speed: raw.up_info_speed,
            free_space,
        })
    }

    /// qBittorrent application version, e.g. `v4.6.2`.
    pub async fn version(&self) -> Result<String> {
        let response = self.send(self.http.get(self.endpoint("app/version")), "app/version").await?;
        Ok(response.text().await?.trim().to_string())
    }
}

fn check_status(response: Response, endpoint: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(QbitError::Status {
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl TorrentSource for QbitClient {
    async fn list_torrents(&self) -> herald_monitor::Result<Vec<TorrentSnapshot>> {
        QbitClient::list_torrents(self)
            .await
            .map_err(|e| MonitorError::Fetch(e.to_string()))
    }
}
