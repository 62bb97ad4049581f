//! Document store abstraction.
//!
//! A store exposes an open-ended set of named collections, each holding
//! heterogeneous JSON documents. The search pipeline only ever lists
//! collections and runs a keyword match inside one of them.

mod document;
mod sqlite;

pub use document::*;
pub use sqlite::SqliteDocumentStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed on collection {collection}: {message}")]
    QueryFailed { collection: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Trait for document store backends.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Enumerate every collection currently in the store.
    ///
    /// Failure here means the store itself is unreachable.
    async fn list_collections(&self) -> Result<Vec<String>, StoreError>;

    /// Find documents in `collection` whose catalog code, title or name
    /// contains `keyword`, case-insensitively.
    async fn find(&self, collection: &str, keyword: &str) -> Result<Vec<RawDocument>, StoreError>;
}
