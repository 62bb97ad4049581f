//! Concurrent keyword search across every collection of a document store.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::metrics::{COLLECTION_QUERIES, FANOUT_DURATION};
use crate::store::DocumentStore;

use super::{CollectionHits, SearchError};

/// Fans a keyword out to all non-excluded collections.
pub struct FanOut {
    store: Arc<dyn DocumentStore>,
    excluded: HashSet<String>,
    max_concurrency: usize,
    timeout: Duration,
}

impl FanOut {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        excluded: impl IntoIterator<Item = String>,
        max_concurrency: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            excluded: excluded.into_iter().collect(),
            max_concurrency: max_concurrency.max(1),
            timeout,
        }
    }

    /// Query every collection for `keyword`.
    ///
    /// A collection that errors or misses the deadline counts as empty.
    /// Collections with no hits are left out. The returned order follows
    /// the store's enumeration order, not completion order.
    ///
    /// One deadline bounds the whole run, listing included. Fails only when
    /// the collection list cannot be read before it.
    pub async fn run(&self, keyword: &str) -> Result<Vec<CollectionHits>, SearchError> {
        let timer = FANOUT_DURATION.start_timer();
        let deadline = Instant::now() + self.timeout;

        let collections = match timeout_at(deadline, self.store.list_collections()).await {
            Ok(Ok(collections)) => collections,
            Ok(Err(e)) => return Err(SearchError::StoreUnavailable(e.to_string())),
            Err(_) => {
                warn!(store = self.store.name(), "Listing collections timed out");
                return Err(SearchError::StoreUnavailable(
                    "listing collections timed out".to_string(),
                ));
            }
        };

        let targets: Vec<(usize, String)> = collections
            .into_iter()
            .filter(|c| !self.excluded.contains(c))
            .enumerate()
            .collect();

        debug!(
            store = self.store.name(),
            collections = targets.len(),
            keyword = keyword,
            "Starting fan-out"
        );

        let mut hits: Vec<(usize, CollectionHits)> = stream::iter(targets)
            .map(|(index, collection)| async move {
                let documents = self.query_collection(&collection, keyword, deadline).await;
                (
                    index,
                    CollectionHits {
                        collection,
                        documents,
                    },
                )
            })
            .buffer_unordered(self.max_concurrency)
            .filter(|(_, hits)| futures::future::ready(!hits.documents.is_empty()))
            .collect()
            .await;

        hits.sort_by_key(|(index, _)| *index);
        timer.observe_duration();

        Ok(hits.into_iter().map(|(_, h)| h).collect())
    }

    async fn query_collection(
        &self,
        collection: &str,
        keyword: &str,
        deadline: Instant,
    ) -> Vec<crate::store::RawDocument> {
        match timeout_at(deadline, self.store.find(collection, keyword)).await {
            Ok(Ok(documents)) => {
                debug!(
                    collection = collection,
                    results = documents.len(),
                    "Collection query complete"
                );
                COLLECTION_QUERIES.with_label_values(&["ok"]).inc();
                documents
            }
            Ok(Err(e)) => {
                warn!(collection = %collection, error = %e, "Collection query failed");
                COLLECTION_QUERIES.with_label_values(&["failed"]).inc();
                Vec::new()
            }
            Err(_) => {
                warn!(collection = %collection, "Collection query timed out");
                COLLECTION_QUERIES.with_label_values(&["timeout"]).inc();
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockDocumentStore};

    fn fanout(store: &Arc<MockDocumentStore>, excluded: &[&str]) -> FanOut {
        FanOut::new(
            Arc::clone(store) as Arc<dyn DocumentStore>,
            excluded.iter().map(|s| s.to_string()),
            4,
            Duration::from_secs(5),
        )
    }

    fn names(hits: &[CollectionHits]) -> Vec<&str> {
        hits.iter().map(|h| h.collection.as_str()).collect()
    }

    #[tokio::test]
    async fn test_queries_all_collections() {
        let store = Arc::new(MockDocumentStore::new());
        store
            .add_collection("a", vec![fixtures::document("abc-1", "first", None)])
            .await;
        store
            .add_collection("b", vec![fixtures::document("abc-2", "second", None)])
            .await;

        let hits = fanout(&store, &[]).run("abc").await.unwrap();
        assert_eq!(names(&hits), vec!["a", "b"]);
        assert_eq!(store.query_count().await, 2);
    }

    #[tokio::test]
    async fn test_excluded_collections_are_never_queried() {
        let store = Arc::new(MockDocumentStore::new());
        store
            .add_collection("system", vec![fixtures::document("abc-1", "x", None)])
            .await;
        store
            .add_collection("videos", vec![fixtures::document("abc-1", "x", None)])
            .await;

        let hits = fanout(&store, &["system"]).run("abc").await.unwrap();
        assert_eq!(names(&hits), vec!["videos"]);

        let queried: Vec<_> = store
            .recorded_queries()
            .await
            .into_iter()
            .map(|q| q.collection)
            .collect();
        assert_eq!(queried, vec!["videos"]);
    }

    #[tokio::test]
    async fn test_failed_collection_degrades_to_empty() {
        let store = Arc::new(MockDocumentStore::new());
        store
            .add_collection("broken", vec![fixtures::document("abc-1", "x", None)])
            .await;
        store
            .add_collection("healthy", vec![fixtures::document("abc-2", "y", None)])
            .await;
        store.fail_collection("broken", "malformed query").await;

        let hits = fanout(&store, &[]).run("abc").await.unwrap();
        assert_eq!(names(&hits), vec!["healthy"]);
    }

    #[tokio::test]
    async fn test_collections_without_matches_are_skipped() {
        let store = Arc::new(MockDocumentStore::new());
        store
            .add_collection("a", vec![fixtures::document("zzz-1", "nothing", None)])
            .await;
        store
            .add_collection("b", vec![fixtures::document("abc-1", "match", None)])
            .await;

        let hits = fanout(&store, &[]).run("abc").await.unwrap();
        assert_eq!(names(&hits), vec!["b"]);
    }

    #[tokio::test]
    async fn test_store_unavailable_is_fatal() {
        let store = Arc::new(MockDocumentStore::new());
        store.set_unavailable(true).await;

        let err = fanout(&store, &[]).run("abc").await.unwrap_err();
        assert!(matches!(err, SearchError::StoreUnavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_collection_times_out_as_empty() {
        let store = Arc::new(MockDocumentStore::new());
        store
            .add_collection("slow", vec![fixtures::document("abc-1", "x", None)])
            .await;
        store
            .add_collection("fast", vec![fixtures::document("abc-2", "y", None)])
            .await;
        store.set_delay("slow", Duration::from_secs(60)).await;

        let hits = fanout(&store, &[]).run("abc").await.unwrap();
        assert_eq!(names(&hits), vec!["fast"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_listing_is_bounded_by_deadline() {
        let store = Arc::new(MockDocumentStore::new());
        store
            .add_collection("a", vec![fixtures::document("abc-1", "x", None)])
            .await;
        store.set_listing_delay(Duration::from_secs(3600)).await;

        let started = Instant::now();
        let err = fanout(&store, &[]).run("abc").await.unwrap_err();

        assert!(matches!(err, SearchError::StoreUnavailable(_)));
        assert!(started.elapsed() <= Duration::from_secs(5));
        assert_eq!(store.query_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_listing_shrinks_remaining_budget() {
        let store = Arc::new(MockDocumentStore::new());
        store
            .add_collection("a", vec![fixtures::document("abc-1", "x", None)])
            .await;
        store.set_listing_delay(Duration::from_secs(4)).await;
        store.set_delay("a", Duration::from_secs(2)).await;

        let hits = fanout(&store, &[]).run("abc").await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_follows_enumeration_not_completion() {
        let store = Arc::new(MockDocumentStore::new());
        for name in ["first", "second", "third"] {
            store
                .add_collection(name, vec![fixtures::document("abc-1", name, None)])
                .await;
        }
        store.set_delay("first", Duration::from_millis(300)).await;
        store.set_delay("second", Duration::from_millis(200)).await;

        let hits = fanout(&store, &[]).run("abc").await.unwrap();
        assert_eq!(names(&hits), vec!["first", "second", "third"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queries_run_concurrently() {
        let store = Arc::new(MockDocumentStore::new());
        for name in ["a", "b", "c", "d"] {
            store
                .add_collection(name, vec![fixtures::document("abc-1", name, None)])
                .await;
            store.set_delay(name, Duration::from_secs(2)).await;
        }

        // Sequential execution would need 8s and blow the 5s deadline.
        let hits = fanout(&store, &[]).run("abc").await.unwrap();
        assert_eq!(hits.len(), 4);
    }
}
