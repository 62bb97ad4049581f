//! Loosely-typed source documents and their defaulting accessors.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields holding the per-source identifier, in priority order.
pub const ID_FIELDS: &[&str] = &["tid", "id"];
/// Field holding the catalog code (e.g. "abc-123").
pub const CODE_FIELD: &str = "number";
/// Fields holding the title, in priority order.
pub const TITLE_FIELDS: &[&str] = &["title", "name"];
/// Fields holding the download link, in priority order.
pub const DOWNLOAD_FIELDS: &[&str] = &["magnet", "magnet_url", "download"];
/// Field holding the size in megabytes.
pub const SIZE_FIELD: &str = "size_mb";
/// Field holding the seeder count.
pub const SEEDERS_FIELD: &str = "seeders";
/// Fields holding the post/creation time, in priority order.
pub const TIMESTAMP_FIELDS: &[&str] = &["post_time", "date"];

/// Epoch values at or above this magnitude are milliseconds, not seconds.
const MILLIS_THRESHOLD: f64 = 1e12;

/// A raw document as returned by a collection.
///
/// No field is guaranteed. Every accessor treats a missing key, `null` and
/// the empty string the same way: the field is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawDocument(Map<String, Value>);

impl RawDocument {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wrap a JSON value; only objects are documents.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Value of `key` if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| is_present(v))
    }

    /// First present value among `keys`.
    pub fn first_present(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|k| self.get(k))
    }

    /// First present value among `keys` rendered as text.
    ///
    /// Numbers render in their JSON form; other non-string values are absent.
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        match self.first_present(keys)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Per-source identifier coerced to an integer.
    ///
    /// The first set identifier decides: a non-numeric one yields `None`
    /// rather than falling through to the next field.
    pub fn source_id(&self) -> Option<i64> {
        self.id_value().and_then(coerce_i64)
    }

    /// Per-source identifier as text, whether or not it is numeric.
    pub fn source_id_text(&self) -> Option<String> {
        match self.id_value()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// First identifier value among [`ID_FIELDS`]. A numeric zero means the
    /// field is unset and the next one is consulted.
    fn id_value(&self) -> Option<&Value> {
        ID_FIELDS
            .iter()
            .find_map(|k| self.get(k).filter(|v| v.as_f64() != Some(0.0)))
    }

    /// Value of `key` coerced to a non-negative number, 0 otherwise.
    pub fn non_negative(&self, key: &str) -> f64 {
        self.get(key)
            .and_then(coerce_f64)
            .filter(|f| f.is_finite() && *f > 0.0)
            .unwrap_or(0.0)
    }

    /// Upper-cased catalog code, if any.
    pub fn catalog_code(&self) -> Option<String> {
        self.text(&[CODE_FIELD])
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty())
    }

    /// Raw title text, empty when absent.
    pub fn title(&self) -> String {
        self.text(TITLE_FIELDS).unwrap_or_default()
    }

    /// Post/creation time, if present and parseable.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.first_present(TIMESTAMP_FIELDS).and_then(parse_timestamp)
    }
}

impl From<Map<String, Value>> for RawDocument {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn coerce_i64(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    coerce_f64(value)
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Parse a timestamp in any of the shapes collections use.
///
/// Accepts epoch seconds or milliseconds (as number or numeric string),
/// RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD`,
/// and extended-JSON `{"$date": ...}` wrappers. Naive times are UTC.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_f64().and_then(from_epoch),
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Object(map) => map.get("$date").and_then(parse_timestamp),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(epoch) = s.parse::<f64>() {
        return from_epoch(epoch);
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
                .ok()
                .map(|ndt| ndt.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|ndt| ndt.and_utc())
        })
}

fn from_epoch(epoch: f64) -> Option<DateTime<Utc>> {
    if !epoch.is_finite() {
        return None;
    }
    if epoch.abs() >= MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(epoch as i64)
    } else {
        DateTime::from_timestamp(epoch as i64, 0)
    }
}
