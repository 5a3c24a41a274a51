//! HTTP client for Jackett's search API.

use std::time::Duration;

use herald_models::SearchResult;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{JackettError, Result};
use crate::model::RawResults;

/// Default per-request timeout. Jackett waits on slow indexers, so this is
/// longer than the qBittorrent one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Jackett's aggregate indexer.
pub const ALL_INDEXERS: &str = "all";

/// Connection settings for a Jackett instance.
#[derive(Clone)]
pub struct JackettConfig {
    /// Base URL, e.g. `http://localhost:9117`.
    pub base_url: Url,
    pub api_key: String,
    /// Indexer ids to query. Empty means [`ALL_INDEXERS`].
    pub indexers: Vec<String>,
    /// Torznab category ids to filter by.
    pub categories: Vec<u32>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for JackettConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JackettConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("indexers", &self.indexers)
            .field("categories", &self.categories)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl JackettConfig {
    /// Parse `base_url` and build a config that searches all indexers.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| JackettError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(JackettError::InvalidUrl(format!(
                "{base_url}: unsupported scheme {}",
                base_url.scheme()
            )));
        }

        Ok(Self {
            base_url,
            api_key: api_key.into(),
            indexers: Vec::new(),
            categories: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_indexers(mut self, indexers: Vec<String>) -> Self {
        self.indexers = indexers;
        self
    }

    pub fn with_categories(mut self, categories: Vec<u32>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for one Jackett instance.
pub struct JackettClient {
    http: Client,
    config: JackettConfig,
}

impl JackettClient {
    /// Build a client. No request is made until the first search.
    pub fn new(config: JackettConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// The connection settings.
    pub fn config(&self) -> &JackettConfig {
        &self.config
    }

    fn results_url(&self, indexer: &str) -> String {
        format!(
            "{}/api/v2.0/indexers/{}/results",
            self.config.base_url.as_str().trim_end_matches('/'),
            indexer
        )
    }

    fn search_params(&self, query: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("apikey", self.config.api_key.clone()),
            ("Query", query.to_string()),
        ];
        params.extend(
            self.config
                .categories
                .iter()
                .map(|cat| ("Category[]", cat.to_string())),
        );
        params
    }

    async fn search_indexer(&self, indexer: &str, query: &str) -> Result<Vec<SearchResult>> {
        let response = self
            .http
            .get(self.results_url(indexer))
            .query(&self.search_params(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(JackettError::Api {
                status: status.as_u16(),
                indexer: indexer.to_string(),
            });
        }

        let body = response.text().await?;
        let raw: RawResults = serde_json::from_str(&body).map_err(|e| JackettError::Parse {
            indexer: indexer.to_string(),
            message: e.to_string(),
        })?;

        Ok(raw
            .results
            .into_iter()
            .filter_map(|release| release.into_result(indexer))
            .collect())
    }

    /// Search every configured indexer for `query`, best seeded first.
    ///
    /// With several indexers a failing one is skipped; the search only fails
    /// when all of them do. With a single indexer its error is returned as is.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(JackettError::EmptyQuery);
        }

        let indexers: Vec<&str> = if self.config.indexers.is_empty() {
            vec![ALL_INDEXERS]
        } else {
            self.config.indexers.iter().map(String::as_str).collect()
        };

        let mut results = Vec::new();
        let mut last_error = None;
        let mut succeeded = 0;

        for indexer in &indexers {
            match self.search_indexer(indexer, query).await {
                Ok(found) => {
                    debug!(indexer, count = found.len(), "indexer answered");
                    succeeded += 1;
                    results.extend(found);
                }
                Err(e) if indexers.len() == 1 => return Err(e),
                Err(e) => {
                    warn!(indexer, error = %e, "indexer failed, skipping");
                    last_error = Some(e);
                }
            }
        }

        if succeeded == 0 {
            if let Some(last) = last_error {
                return Err(JackettError::AllIndexersFailed {
                    count: indexers.len(),
                    last: Box::new(last),
                });
            }
        }

        results.sort_by(|a, b| b.seeders.cmp(&a.seeders));
        info!(query, count = results.len(), "search finished");
        Ok(results)
    }
}
