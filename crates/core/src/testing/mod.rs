//! Testing utilities and mock implementations.
//!
//! This module provides an in-memory document store and a manual clock so
//! the search pipeline can be exercised without a database or real time.
//!
//! # Example
//!
//! ```rust,ignore
//! use btagg_core::testing::{fixtures, ManualClock, MockDocumentStore};
//!
//! let store = MockDocumentStore::new();
//! store.add_collection("hd_chinese_subtitles", vec![
//!     fixtures::document("ABC-123", "Sample", Some("2024-01-01 00:00:00")),
//! ]).await;
//!
//! let clock = ManualClock::new();
//! clock.advance(Duration::from_secs(3600));
//! ```

mod manual_clock;
mod mock_document_store;

pub use manual_clock::ManualClock;
pub use mock_document_store::{MockDocumentStore, RecordedQuery};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Map, Value};

    use crate::searcher::NormalizedTorrent;
    use crate::store::RawDocument;

    /// Create a raw document with a catalog code, a title and an optional
    /// `post_time`.
    pub fn document(code: &str, title: &str, post_time: Option<&str>) -> RawDocument {
        let mut fields = Map::new();
        fields.insert("number".to_string(), json!(code));
        fields.insert("title".to_string(), json!(title));
        fields.insert(
            "magnet".to_string(),
            json!(format!("magnet:?xt=urn:btih:{}", code.to_lowercase())),
        );
        fields.insert("size_mb".to_string(), json!(1024.0));
        fields.insert("seeders".to_string(), json!(10));
        if let Some(post_time) = post_time {
            fields.insert("post_time".to_string(), Value::String(post_time.to_string()));
        }
        RawDocument::new(fields)
    }

    /// Create a normalized torrent with reasonable defaults.
    pub fn torrent(id: i64, title: &str) -> NormalizedTorrent {
        NormalizedTorrent {
            id,
            title: title.to_string(),
            download_url: format!("magnet:?xt=urn:btih:{:040x}", id),
            size_mb: 1024.0,
            seeders: 10,
            site: "Sehuatang".to_string(),
            chinese: false,
            uc: false,
            uhd: false,
            free: true,
        }
    }

    /// Create `n` torrents with ids `1..=n`.
    pub fn torrents(n: usize) -> Vec<NormalizedTorrent> {
        (1..=n as i64)
            .map(|id| torrent(id, &format!("Torrent {}", id)))
            .collect()
    }
}
