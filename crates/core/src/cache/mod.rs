//! In-memory TTL cache of full search result sets.
//!
//! Entries are keyed by the normalized keyword and hold the complete,
//! sorted, unpaginated result set. Expiry is checked lazily on read; there
//! is no background sweep and no size bound.

mod clock;

pub use clock::{Clock, SystemClock};

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::searcher::NormalizedTorrent;

/// Normalize a raw keyword: trimmed and lower-cased.
///
/// Used both as the cache key and as the text sent to the store, so a cache
/// hit always corresponds to the same query.
pub fn normalize_keyword(raw: &str) -> String {
    raw.trim().to_lowercase()
}

struct CacheEntry {
    results: Arc<Vec<NormalizedTorrent>>,
    expires_at: Instant,
}

/// TTL cache of search results.
pub struct ResultCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    /// Create a cache on the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up the result set for `keyword`.
    ///
    /// An expired entry is absent, and is evicted by the read that notices it.
    pub fn get(&self, keyword: &str) -> Option<Arc<Vec<NormalizedTorrent>>> {
        let key = normalize_keyword(keyword);
        let now = self.clock.now();

        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(&key) {
                None => return None,
                Some(entry) if now < entry.expires_at => return Some(Arc::clone(&entry.results)),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // A concurrent put may have replaced the expired entry meanwhile.
        match entries.get(&key) {
            Some(entry) if now < entry.expires_at => Some(Arc::clone(&entry.results)),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Store the full result set for `keyword`, replacing any previous entry.
    pub fn put(&self, keyword: &str, results: Vec<NormalizedTorrent>) -> Arc<Vec<NormalizedTorrent>> {
        let results = Arc::new(results);
        let entry = CacheEntry {
            results: Arc::clone(&results),
            expires_at: self.clock.now() + self.ttl,
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalize_keyword(keyword), entry);
        results
    }

    /// Number of stored entries, expired ones included until observed.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
