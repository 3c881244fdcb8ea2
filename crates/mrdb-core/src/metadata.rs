//! Flat scalar metadata and index-ready entries.
//!
//! The downstream store only accepts scalar payload values, so every
//! composite (lists, maps) is serialized to a JSON string before it reaches a
//! [`Metadata`] map. [`MetaValue`] cannot represent nesting by construction.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single scalar metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl MetaValue {
    /// Encode a composite value as its compact JSON text.
    #[must_use]
    pub fn encoded(value: &serde_json::Value) -> Self {
        Self::Text(value.to_string())
    }

    /// Convert an arbitrary JSON value into a scalar.
    ///
    /// Returns `None` for JSON `null`. Arrays and objects are encoded as
    /// JSON strings; empty composites yield `None`.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Array(items) if items.is_empty() => None,
            serde_json::Value::Object(map) if map.is_empty() => None,
            composite => Some(Self::encoded(composite)),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<usize> for MetaValue {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or(Self::Float(f64::MAX), Self::Int)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Flat metadata map. Keys are sorted so serialized payloads are stable.
pub type Metadata = BTreeMap<String, MetaValue>;

/// Insert `value` under `key` when present; `None` is omitted entirely.
pub fn insert_opt<V: Into<MetaValue>>(meta: &mut Metadata, key: &str, value: Option<V>) {
    if let Some(v) = value {
        meta.insert(key.to_string(), v.into());
    }
}

/// One record ready for the index store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Unique across the whole index.
    pub id: String,
    /// Normalized document text; never empty.
    pub document: String,
    pub metadata: Metadata,
}
