//! Top-level search entry point.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::{normalize_keyword, ResultCache};
use crate::config::Config;
use crate::metrics::{SEARCHES, SEARCH_RESULTS};
use crate::store::DocumentStore;

use super::{
    deduplicate_documents, merge_and_sort, paginate, Classifier, FanOut, NormalizedTorrent,
    Normalizer, SearchError, SearchPage, TimestampedTorrent,
};

/// Serves paginated search results, backed by the fan-out and the cache.
pub struct SearchService {
    fanout: FanOut,
    normalizer: Normalizer,
    cache: Arc<ResultCache>,
    page_size: usize,
}

impl SearchService {
    pub fn new(
        fanout: FanOut,
        normalizer: Normalizer,
        cache: Arc<ResultCache>,
        page_size: usize,
    ) -> Self {
        Self {
            fanout,
            normalizer,
            cache,
            page_size: page_size.max(1),
        }
    }

    /// Build a service from configuration, using a system-clock cache.
    pub fn from_config(config: &Config, store: Arc<dyn DocumentStore>) -> Self {
        let cache = Arc::new(ResultCache::new(Duration::from_secs(
            config.search.cache_ttl_secs,
        )));
        Self::with_cache(config, store, cache)
    }

    /// Build a service from configuration with a caller-supplied cache.
    pub fn with_cache(
        config: &Config,
        store: Arc<dyn DocumentStore>,
        cache: Arc<ResultCache>,
    ) -> Self {
        let fanout = FanOut::new(
            store,
            config.search.excluded_collections.iter().cloned(),
            config.store.max_concurrency,
            Duration::from_millis(config.store.query_timeout_ms),
        );
        let normalizer = Normalizer::new(
            config.search.site.clone(),
            Classifier::new(&config.classification),
        );
        Self::new(fanout, normalizer, cache, config.search.page_size)
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Search for `keyword` and return the requested 1-based page.
    ///
    /// A blank keyword yields an empty page without touching the store or
    /// the cache. The full result set is cached per normalized keyword so
    /// later pages are served without re-querying.
    pub async fn search(&self, keyword: &str, page: u32) -> Result<SearchPage, SearchError> {
        let keyword = normalize_keyword(keyword);
        if keyword.is_empty() {
            SEARCHES.with_label_values(&["empty"]).inc();
            return Ok(SearchPage::empty());
        }

        let results = match self.cache.get(&keyword) {
            Some(results) => {
                debug!(keyword = %keyword, total = results.len(), "Cache hit");
                SEARCHES.with_label_values(&["hit"]).inc();
                results
            }
            None => {
                let results = self.collect(&keyword).await?;
                SEARCHES.with_label_values(&["miss"]).inc();
                self.cache.put(&keyword, results)
            }
        };

        Ok(SearchPage {
            data: paginate(&results, page, self.page_size),
            total: Some(results.len()),
            page: Some(page.max(1)),
            limit: Some(self.page_size),
        })
    }

    /// Run the uncached pipeline: fan-out, per-collection dedup, normalize,
    /// then merge newest first.
    async fn collect(&self, keyword: &str) -> Result<Vec<NormalizedTorrent>, SearchError> {
        let hits = self.fanout.run(keyword).await?;
        let collections = hits.len();

        let batches: Vec<Vec<TimestampedTorrent>> = hits
            .into_iter()
            .map(|hits| {
                deduplicate_documents(hits.documents)
                    .iter()
                    .map(|doc| self.normalizer.normalize_timestamped(doc, &hits.collection))
                    .collect()
            })
            .collect();

        let results = merge_and_sort(batches);
        SEARCH_RESULTS.observe(results.len() as f64);

        info!(
            keyword = %keyword,
            collections = collections,
            total = results.len(),
            "Search complete"
        );

        Ok(results)
    }
}
