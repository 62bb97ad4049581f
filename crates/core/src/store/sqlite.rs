//! SQLite-backed document store.
//!
//! Every table in the database file is a collection. Each row stores one
//! JSON document in its `doc` column.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags};
use serde_json::Value;
use tracing::debug;

use super::{DocumentStore, RawDocument, StoreError};

/// SQLite-backed document store.
///
/// Queries open their own read-only connection on the blocking pool, so
/// concurrent searches over different collections do not serialize on a
/// shared handle.
pub struct SqliteDocumentStore {
    path: PathBuf,
}

impl SqliteDocumentStore {
    /// Open the store, creating an empty database file if needed.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn =
            Connection::open(path).map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
        conn.query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a document into `collection`, creating the collection if needed.
    pub fn insert(&self, collection: &str, doc: &Value) -> Result<(), StoreError> {
        let conn = Connection::open(&self.path)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
        let table = quote_identifier(collection);

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                doc TEXT NOT NULL
            );"
        ))
        .map_err(|e| query_failed(collection, e))?;

        conn.execute(
            &format!("INSERT INTO {table} (doc) VALUES (?1)"),
            params![doc.to_string()],
        )
        .map_err(|e| query_failed(collection, e))?;

        Ok(())
    }

    fn connect_read_only(path: &Path) -> Result<Connection, StoreError> {
        Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| StoreError::ConnectionFailed(e.to_string()))
    }

    fn list_blocking(path: &Path) -> Result<Vec<String>, StoreError> {
        let conn = Self::connect_read_only(path)?;
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row.map_err(|e| StoreError::ConnectionFailed(e.to_string()))?);
        }
        Ok(names)
    }

    fn find_blocking(
        path: &Path,
        collection: &str,
        keyword: &str,
    ) -> Result<Vec<RawDocument>, StoreError> {
        let conn = Self::connect_read_only(path)?;
        register_unicode_lower(&conn).map_err(|e| query_failed(collection, e))?;
        let table = quote_identifier(collection);
        let sql = format!(
            "SELECT doc FROM {table}
             WHERE instr(ulower(json_extract(doc, '$.number')), ?1) > 0
                OR instr(ulower(json_extract(doc, '$.title')), ?1) > 0
                OR instr(ulower(json_extract(doc, '$.name')), ?1) > 0
             ORDER BY rowid"
        );

        let mut stmt = conn.prepare(&sql).map_err(|e| query_failed(collection, e))?;
        let rows = stmt
            .query_map(params![keyword.to_lowercase()], |row| row.get::<_, String>(0))
            .map_err(|e| query_failed(collection, e))?;

        let mut docs = Vec::new();
        for row in rows {
            let raw = row.map_err(|e| query_failed(collection, e))?;
            match serde_json::from_str::<Value>(&raw)
                .ok()
                .and_then(RawDocument::from_value)
            {
                Some(doc) => docs.push(doc),
                None => debug!(collection = collection, "Skipping non-object document"),
            }
        }
        Ok(docs)
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::list_blocking(&path))
            .await
            .map_err(|e| StoreError::Internal(e.to_string()))?
    }

    async fn find(&self, collection: &str, keyword: &str) -> Result<Vec<RawDocument>, StoreError> {
        let path = self.path.clone();
        let collection = collection.to_string();
        let keyword = keyword.to_string();
        tokio::task::spawn_blocking(move || Self::find_blocking(&path, &collection, &keyword))
            .await
            .map_err(|e| StoreError::Internal(e.to_string()))?
    }
}

/// Register `ulower(x)`: text lower-cased with the same Unicode rules as the
/// keyword. SQLite's built-in `lower()` only folds ASCII.
fn register_unicode_lower(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "ulower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let lowered = match ctx.get_raw(0) {
                ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).to_lowercase(),
                ValueRef::Integer(i) => i.to_string(),
                ValueRef::Real(f) => f.to_string(),
                ValueRef::Null | ValueRef::Blob(_) => String::new(),
            };
            Ok(lowered)
        },
    )
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn query_failed(collection: &str, e: rusqlite::Error) -> StoreError {
    StoreError::QueryFailed {
        collection: collection.to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, SqliteDocumentStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteDocumentStore::open(&dir.path().join("docs.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("plain"), "\"plain\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[tokio::test]
    async fn test_list_collections_sorted() {
        let (_dir, store) = temp_store();
        store.insert("4k_video", &json!({"title": "a"})).unwrap();
        store.insert("EU_US_no_mosaic", &json!({"title": "b"})).unwrap();
        store.insert("domestic_original", &json!({"title": "c"})).unwrap();

        let names = store.list_collections().await.unwrap();
        assert_eq!(names, vec!["4k_video", "EU_US_no_mosaic", "domestic_original"]);
    }

    #[tokio::test]
    async fn test_list_collections_empty_database() {
        let (_dir, store) = temp_store();
        assert!(store.list_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_matches_code_and_title_case_insensitively() {
        let (_dir, store) = temp_store();
        store
            .insert("col", &json!({"number": "abc-123", "title": "First"}))
            .unwrap();
        store
            .insert("col", &json!({"number": "xyz-999", "title": "Contains ABC inside"}))
            .unwrap();
        store
            .insert("col", &json!({"number": "zzz-000", "title": "Unrelated"}))
            .unwrap();

        let docs = store.find("col", "AbC").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title(), "First");
        assert_eq!(docs[1].title(), "Contains ABC inside");
    }

    #[tokio::test]
    async fn test_find_folds_non_ascii_case() {
        let (_dir, store) = temp_store();
        store
            .insert("col", &json!({"title": "ＦＨＤ 破解 ÉTÉ"}))
            .unwrap();
        store.insert("col", &json!({"title": "plain"})).unwrap();

        for keyword in ["ＦＨＤ", "ｆｈｄ", "ÉTÉ", "été", "破解"] {
            let docs = store
                .find("col", &crate::cache::normalize_keyword(keyword))
                .await
                .unwrap();
            assert_eq!(docs.len(), 1, "keyword {:?}", keyword);
        }
    }

    #[tokio::test]
    async fn test_find_matches_name_field() {
        let (_dir, store) = temp_store();
        store.insert("col", &json!({"name": "Named release"})).unwrap();

        let docs = store.find("col", "named").await.unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn test_find_matches_numeric_code() {
        let (_dir, store) = temp_store();
        store.insert("col", &json!({"number": 20240615})).unwrap();

        let docs = store.find("col", "0615").await.unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn test_find_treats_keyword_literally() {
        let (_dir, store) = temp_store();
        store.insert("col", &json!({"title": "abc"})).unwrap();

        assert!(store.find("col", "a%c").await.unwrap().is_empty());
        assert!(store.find("col", "a.c").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_unknown_collection_fails() {
        let (_dir, store) = temp_store();
        let err = store.find("missing", "x").await.unwrap_err();
        assert!(matches!(err, StoreError::QueryFailed { .. }));
    }

    #[tokio::test]
    async fn test_find_on_foreign_table_fails() {
        let (dir, store) = temp_store();
        let conn = Connection::open(dir.path().join("docs.db")).unwrap();
        conn.execute_batch("CREATE TABLE users (name TEXT);").unwrap();

        let err = store.find("users", "x").await.unwrap_err();
        assert!(matches!(err, StoreError::QueryFailed { .. }));
    }
}
