//! Conversion of raw collection documents into the uniform result schema.

use crate::store::{RawDocument, DOWNLOAD_FIELDS, SEEDERS_FIELD, SIZE_FIELD};

use super::classify::Classifier;
use super::{NormalizedTorrent, TimestampedTorrent};

/// Builds `NormalizedTorrent`s for one site.
#[derive(Debug, Clone)]
pub struct Normalizer {
    site: String,
    classifier: Classifier,
}

impl Normalizer {
    pub fn new(site: impl Into<String>, classifier: Classifier) -> Self {
        Self {
            site: site.into(),
            classifier,
        }
    }

    /// Normalize a document from `collection`. Never fails: every missing or
    /// malformed field falls back to its default.
    pub fn normalize(&self, doc: &RawDocument, collection: &str) -> NormalizedTorrent {
        let raw_title = doc.title();
        let title = match doc.catalog_code() {
            Some(code) => format!("[{}] {}", code, raw_title),
            None => raw_title.clone(),
        };

        NormalizedTorrent {
            id: doc.source_id().unwrap_or(0),
            title,
            download_url: doc.text(DOWNLOAD_FIELDS).unwrap_or_default(),
            size_mb: doc.non_negative(SIZE_FIELD),
            seeders: doc.non_negative(SEEDERS_FIELD) as u64,
            site: self.site.clone(),
            chinese: self.classifier.is_chinese_source(collection),
            uc: self.classifier.is_uncensored(collection, &raw_title),
            uhd: self.classifier.is_uhd(collection),
            free: true,
        }
    }

    /// Normalize and keep the document's timestamp for ordering.
    pub fn normalize_timestamped(&self, doc: &RawDocument, collection: &str) -> TimestampedTorrent {
        TimestampedTorrent {
            torrent: self.normalize(doc, collection),
            timestamp: doc.timestamp(),
        }
    }
}
