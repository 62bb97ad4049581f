//! Collection-based classification rules.

use std::collections::HashSet;

use crate::config::ClassificationConfig;

/// Maps a collection (and raw title) to result facets.
#[derive(Debug, Clone)]
pub struct Classifier {
    chinese: HashSet<String>,
    uncensored: HashSet<String>,
    uhd: HashSet<String>,
    decensor_marker: String,
}

impl Classifier {
    pub fn new(config: &ClassificationConfig) -> Self {
        Self {
            chinese: config.chinese.iter().cloned().collect(),
            uncensored: config.uncensored.iter().cloned().collect(),
            uhd: config.uhd.iter().cloned().collect(),
            decensor_marker: config.decensor_marker.clone(),
        }
    }

    pub fn is_chinese_source(&self, collection: &str) -> bool {
        self.chinese.contains(collection)
    }

    /// Uncensored collections, or any title carrying the decensor marker.
    pub fn is_uncensored(&self, collection: &str, raw_title: &str) -> bool {
        self.uncensored.contains(collection)
            || (!self.decensor_marker.is_empty() && raw_title.contains(&self.decensor_marker))
    }

    pub fn is_uhd(&self, collection: &str) -> bool {
        self.uhd.contains(collection)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassificationConfig::default())
    }
}
