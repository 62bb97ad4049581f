//! Deduplication of raw documents within a single collection.

use std::collections::HashMap;

use crate::store::RawDocument;

/// Identity of a document within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NaturalKey {
    Id(String),
    Code(String),
    Title(String),
}

/// Natural key of a document: its identifier, else its catalog code, else
/// its title. `None` when the document has none of them.
///
/// Numeric identifiers are keyed by their integer value so `5`, `"5"` and
/// `"5.0"` are the same item.
pub fn natural_key(doc: &RawDocument) -> Option<NaturalKey> {
    let id = doc
        .source_id()
        .map(|id| id.to_string())
        .or_else(|| doc.source_id_text());
    if let Some(id) = id {
        return Some(NaturalKey::Id(id));
    }
    if let Some(code) = doc.catalog_code() {
        return Some(NaturalKey::Code(code));
    }
    let title = doc.title();
    if title.is_empty() {
        None
    } else {
        Some(NaturalKey::Title(title))
    }
}

/// Deduplicate one collection's raw documents by natural key.
///
/// On a duplicate key the newcomer only replaces the kept document when its
/// timestamp is strictly newer; a missing timestamp is older than any
/// present one. Documents without a natural key are dropped.
///
/// Output keeps the slot of each key's first arrival.
pub fn deduplicate_documents(docs: Vec<RawDocument>) -> Vec<RawDocument> {
    let mut slots: HashMap<NaturalKey, usize> = HashMap::new();
    let mut kept: Vec<RawDocument> = Vec::new();

    for doc in docs {
        let Some(key) = natural_key(&doc) else {
            continue;
        };

        match slots.get(&key) {
            Some(&slot) => {
                if doc.timestamp() > kept[slot].timestamp() {
                    kept[slot] = doc;
                }
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(doc);
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(value: Value) -> RawDocument {
        RawDocument::from_value(value).unwrap()
    }

    #[test]
    fn test_natural_key_priority() {
        assert_eq!(
            natural_key(&doc(json!({"tid": 5, "number": "a-1", "title": "t"}))),
            Some(NaturalKey::Id("5".to_string()))
        );
        assert_eq!(
            natural_key(&doc(json!({"number": "a-1", "title": "t"}))),
            Some(NaturalKey::Code("A-1".to_string()))
        );
        assert_eq!(
            natural_key(&doc(json!({"title": "t"}))),
            Some(NaturalKey::Title("t".to_string()))
        );
        assert_eq!(natural_key(&doc(json!({"magnet": "m"}))), None);
    }

    #[test]
    fn test_numeric_ids_share_a_key_across_encodings() {
        assert_eq!(
            natural_key(&doc(json!({"tid": "5.0"}))),
            Some(NaturalKey::Id("5".to_string()))
        );
        let results = deduplicate_documents(vec![
            doc(json!({"tid": 5, "title": "old", "date": "2024-01-01"})),
            doc(json!({"tid": "5.0", "title": "new", "date": "2024-06-01"})),
            doc(json!({"tid": " 5 ", "title": "spaced"})),
        ]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), "new");
    }

    #[test]
    fn test_zero_id_falls_through_like_normalize() {
        assert_eq!(
            natural_key(&doc(json!({"tid": 0, "id": 7}))),
            Some(NaturalKey::Id("7".to_string()))
        );
        assert_eq!(
            natural_key(&doc(json!({"tid": 0, "number": "a-1"}))),
            Some(NaturalKey::Code("A-1".to_string()))
        );
    }

    #[test]
    fn test_id_and_code_keys_do_not_collide() {
        let results = deduplicate_documents(vec![
            doc(json!({"id": "ABC"})),
            doc(json!({"number": "abc"})),
        ]);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_dedup_keeps_newer_document() {
        let results = deduplicate_documents(vec![
            doc(json!({"number": "abc-123", "title": "old", "post_time": "2024-01-01"})),
            doc(json!({"number": "ABC-123", "title": "new", "post_time": "2024-06-01"})),
        ]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), "new");
    }

    #[test]
    fn test_dedup_keeps_newer_regardless_of_order() {
        let results = deduplicate_documents(vec![
            doc(json!({"tid": 1, "title": "new", "date": "2024-06-01"})),
            doc(json!({"tid": 1, "title": "old", "date": "2024-01-01"})),
        ]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), "new");
    }

    #[test]
    fn test_dedup_tie_keeps_first_arrival() {
        let results = deduplicate_documents(vec![
            doc(json!({"tid": 1, "title": "first", "date": "2024-06-01"})),
            doc(json!({"tid": 1, "title": "second", "date": "2024-06-01"})),
        ]);
        assert_eq!(results[0].title(), "first");

        let results = deduplicate_documents(vec![
            doc(json!({"tid": 1, "title": "first"})),
            doc(json!({"tid": 1, "title": "second"})),
        ]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), "first");
    }

    #[test]
    fn test_dedup_timestamp_beats_missing_timestamp() {
        let results = deduplicate_documents(vec![
            doc(json!({"tid": 1, "title": "undated"})),
            doc(json!({"tid": 1, "title": "dated", "date": "2020-01-01"})),
        ]);
        assert_eq!(results[0].title(), "dated");
    }

    #[test]
    fn test_dedup_drops_keyless_documents() {
        let results = deduplicate_documents(vec![
            doc(json!({"magnet": "magnet:a"})),
            doc(json!({"title": ""})),
            doc(json!({"title": "kept"})),
        ]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), "kept");
    }

    #[test]
    fn test_dedup_preserves_first_arrival_slots() {
        let results = deduplicate_documents(vec![
            doc(json!({"title": "a"})),
            doc(json!({"title": "b"})),
            doc(json!({"title": "a", "date": "2024-01-01"})),
            doc(json!({"title": "c"})),
        ]);
        let titles: Vec<_> = results.iter().map(|d| d.title()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert!(results[0].timestamp().is_some());
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let input = vec![
            doc(json!({"tid": 1, "date": "2024-01-01"})),
            doc(json!({"tid": 1, "date": "2024-03-01"})),
            doc(json!({"number": "x-1"})),
            doc(json!({"number": "X-1", "date": "2023-01-01"})),
            doc(json!({"title": "solo"})),
            doc(json!({"magnet": "dropped"})),
        ];
        let once = deduplicate_documents(input);
        let twice = deduplicate_documents(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_dedup_empty() {
        assert!(deduplicate_documents(Vec::new()).is_empty());
    }
}
