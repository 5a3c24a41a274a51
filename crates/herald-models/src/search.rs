//! Torrent search results from an indexer aggregator.

use serde::{Deserialize, Serialize};

/// One release found by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    /// Size in bytes, 0 when the indexer does not report it.
    pub size: u64,
    pub seeders: u32,
    pub leechers: u32,
    /// Magnet link when available, otherwise a download URL.
    pub link: String,
    /// Identifier of the indexer that returned the release.
    pub indexer: String,
    /// Publication date as reported by the indexer.
    pub published: Option<String>,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, link: impl Into<String>, indexer: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            size: 0,
            seeders: 0,
            leechers: 0,
            link: link.into(),
            indexer: indexer.into(),
            published: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_peers(mut self, seeders: u32, leechers: u32) -> Self {
        self.seeders = seeders;
        self.leechers = leechers;
        self
    }

    pub fn with_published(mut self, published: impl Into<String>) -> Self {
        self.published = Some(published.into());
        self
    }

    /// Returns true if the link is a magnet link that can be sent back to
    /// the bot as is.
    pub fn is_magnet(&self) -> bool {
        self.link
            .get(..7)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("magnet:"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_magnet() {
        let magnet = SearchResult::new("Fedora", "magnet:?xt=urn:btih:abc", "all");
        assert!(magnet.is_magnet());

        let upper = SearchResult::new("Fedora", "MAGNET:?xt=urn:btih:abc", "all");
        assert!(upper.is_magnet());

        let http = SearchResult::new("Fedora", "http://jackett/dl/1.torrent", "all");
        assert!(!http.is_magnet());
        assert!(!SearchResult::new("x", "mag", "all").is_magnet());
    }
}
