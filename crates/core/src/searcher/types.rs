//! Types for the aggregated search pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::RawDocument;

/// A search result in the uniform wire schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTorrent {
    /// Source identifier, 0 when unknown.
    pub id: i64,
    /// Title, prefixed with `[CODE] ` when the source carries a catalog code.
    pub title: String,
    /// Magnet or download link, empty when unknown.
    pub download_url: String,
    /// Size in megabytes.
    pub size_mb: f64,
    /// Seeder count.
    pub seeders: u64,
    /// Site label.
    pub site: String,
    /// Chinese subtitles.
    pub chinese: bool,
    /// Uncensored.
    pub uc: bool,
    /// Ultra-high-definition.
    pub uhd: bool,
    /// Always true.
    pub free: bool,
}

/// A normalized result paired with its sort key.
///
/// The timestamp only drives ordering and is dropped before a result is
/// cached or returned.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampedTorrent {
    pub torrent: NormalizedTorrent,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Raw matches from a single collection.
#[derive(Debug, Clone)]
pub struct CollectionHits {
    pub collection: String,
    pub documents: Vec<RawDocument>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub data: Vec<NormalizedTorrent>,
    /// Size of the full result set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl SearchPage {
    /// Response for a blank keyword.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total: None,
            page: None,
            limit: None,
        }
    }
}

/// Errors that fail a whole search.
///
/// Per-collection failures never surface here; they degrade to an empty
/// collection inside the fan-out.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),
}
