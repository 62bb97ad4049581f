//! Mock document store for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::store::{DocumentStore, RawDocument, StoreError, CODE_FIELD, TITLE_FIELDS};

/// A recorded per-collection query for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    /// The collection that was queried.
    pub collection: String,
    /// The keyword as received by the store.
    pub keyword: String,
}

/// Mock implementation of the DocumentStore trait.
///
/// Provides controllable behavior for testing:
/// - Collections listed in insertion order
/// - Per-collection failures and delays, plus a listing delay
/// - Store-wide unavailability
/// - Recorded queries for assertions
///
/// # Example
///
/// ```rust,ignore
/// use btagg_core::testing::{fixtures, MockDocumentStore};
///
/// let store = MockDocumentStore::new();
/// store.add_collection("videos", vec![
///     fixtures::document("ABC-123", "Sample", Some("2024-01-01 00:00:00")),
/// ]).await;
/// store.set_delay("videos", Duration::from_millis(50)).await;
///
/// let hits = store.find("videos", "abc").await?;
/// assert_eq!(hits.len(), 1);
/// assert_eq!(store.query_count().await, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockDocumentStore {
    /// Collections and their documents, in listing order.
    collections: Arc<RwLock<Vec<(String, Vec<RawDocument>)>>>,
    /// Collections whose queries fail, with the error message.
    failures: Arc<RwLock<HashMap<String, String>>>,
    /// Simulated per-collection query latency.
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    /// Simulated latency of listing collections.
    listing_delay: Arc<RwLock<Option<Duration>>>,
    /// When set, listing collections fails.
    unavailable: Arc<RwLock<bool>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<RecordedQuery>>>,
    /// Number of collection listings.
    listings: Arc<RwLock<usize>>,
}

impl MockDocumentStore {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection, replacing any existing one with the same name.
    pub async fn add_collection(&self, name: &str, documents: Vec<RawDocument>) {
        let mut collections = self.collections.write().await;
        match collections.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = documents,
            None => collections.push((name.to_string(), documents)),
        }
    }

    /// Append a document, creating the collection if needed.
    pub async fn add_document(&self, collection: &str, document: RawDocument) {
        let mut collections = self.collections.write().await;
        match collections.iter_mut().find(|(n, _)| n == collection) {
            Some((_, existing)) => existing.push(document),
            None => collections.push((collection.to_string(), vec![document])),
        }
    }

    /// Make every query against `collection` fail.
    pub async fn fail_collection(&self, collection: &str, message: &str) {
        self.failures
            .write()
            .await
            .insert(collection.to_string(), message.to_string());
    }

    /// Delay every query against `collection`.
    pub async fn set_delay(&self, collection: &str, delay: Duration) {
        self.delays
            .write()
            .await
            .insert(collection.to_string(), delay);
    }

    /// Delay every collection listing.
    pub async fn set_listing_delay(&self, delay: Duration) {
        *self.listing_delay.write().await = Some(delay);
    }

    /// Make the store as a whole unreachable.
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    /// Get recorded queries, in the order they started.
    pub async fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.queries.read().await.clone()
    }

    /// Get the number of per-collection queries performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Get the number of times collections were listed.
    pub async fn list_count(&self) -> usize {
        *self.listings.read().await
    }
}

fn matches_keyword(document: &RawDocument, keyword: &str) -> bool {
    std::iter::once(CODE_FIELD)
        .chain(TITLE_FIELDS.iter().copied())
        .filter_map(|field| document.text(&[field]))
        .any(|text| text.to_lowercase().contains(keyword))
}

#[async_trait]
impl DocumentStore for MockDocumentStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        *self.listings.write().await += 1;

        let delay = *self.listing_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.unavailable.read().await {
            return Err(StoreError::ConnectionFailed(
                "mock store unavailable".to_string(),
            ));
        }

        Ok(self
            .collections
            .read()
            .await
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn find(&self, collection: &str, keyword: &str) -> Result<Vec<RawDocument>, StoreError> {
        self.queries.write().await.push(RecordedQuery {
            collection: collection.to_string(),
            keyword: keyword.to_string(),
        });

        let delay = self.delays.read().await.get(collection).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failures.read().await.get(collection) {
            return Err(StoreError::QueryFailed {
                collection: collection.to_string(),
                message: message.clone(),
            });
        }

        let keyword = keyword.to_lowercase();
        let collections = self.collections.read().await;
        let documents = collections
            .iter()
            .find(|(name, _)| name == collection)
            .map(|(_, docs)| docs)
            .ok_or_else(|| StoreError::QueryFailed {
                collection: collection.to_string(),
                message: "no such collection".to_string(),
            })?;

        Ok(documents
            .iter()
            .filter(|doc| matches_keyword(doc, &keyword))
            .cloned()
            .collect())
    }
}
