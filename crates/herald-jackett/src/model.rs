//! Wire types of Jackett's JSON results endpoint.

use herald_models::SearchResult;
use serde::Deserialize;

/// Body of `GET /api/v2.0/indexers/{id}/results`; only the part we read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawResults {
    #[serde(default)]
    pub results: Vec<RawRelease>,
}

/// One release. Most numeric fields are nullable in Jackett's output.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawRelease {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub seeders: Option<i64>,
    /// Seeders plus leechers.
    #[serde(default)]
    pub peers: Option<i64>,
    #[serde(default)]
    pub magnet_uri: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub tracker_id: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
}

fn count(value: Option<i64>) -> u32 {
    value.unwrap_or(0).clamp(0, u32::MAX as i64) as u32
}

impl RawRelease {
    /// Convert to a [`SearchResult`]. Releases with neither a magnet link nor
    /// a download link are useless to the bot and yield `None`.
    pub fn into_result(self, indexer: &str) -> Option<SearchResult> {
        let link = self
            .magnet_uri
            .filter(|l| !l.trim().is_empty())
            .or(self.link.filter(|l| !l.trim().is_empty()))?;

        let seeders = count(self.seeders);
        let leechers = count(self.peers).saturating_sub(seeders);
        let indexer = self
            .tracker_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| indexer.to_string());

        let mut result = SearchResult::new(self.title, link, indexer)
            .with_size(self.size.unwrap_or(0).max(0) as u64)
            .with_peers(seeders, leechers);
        if let Some(published) = self.publish_date {
            result = result.with_published(published);
        }
        Some(result)
    }
}
