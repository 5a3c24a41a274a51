//! Jackett search client for Torrent Herald.
//!
//! Queries Jackett's JSON results endpoint, either through the aggregate
//! `all` indexer or a configured list of indexers, and turns the releases
//! into [`herald_models::SearchResult`]s sorted by seeders.

pub mod client;
pub mod error;
pub mod model;

pub use client::{JackettClient, JackettConfig, ALL_INDEXERS, DEFAULT_TIMEOUT};
pub use error::{JackettError, Result};
