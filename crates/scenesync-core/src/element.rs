//! Element: an ordered, versioned unit of drawing content.
//!
//! The sync layer only reads a handful of attributes (identity, version,
//! ordering, deletion). Everything else an element carries is kept in an
//! opaque property map so it survives encryption round trips untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::ElementId;

/// A drawing element as seen by the sync layer.
///
/// Elements are immutable value records here: the sync layer replaces whole
/// sequences and never edits an element in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Stable identifier shared by every version of the element.
    pub id: ElementId,

    /// Element type (`rectangle`, `arrow`, `image`, ...).
    #[serde(rename = "type")]
    pub kind: String,

    /// Monotonic edit counter, bumped on every change.
    pub version: u64,

    /// Random tie-breaker for concurrent edits at the same version.
    #[serde(default)]
    pub version_nonce: u32,

    /// Fractional index determining z-order.
    #[serde(default)]
    pub index: Option<String>,

    /// Soft-deletion flag.
    #[serde(default)]
    pub is_deleted: bool,

    /// Last update time (Unix ms).
    #[serde(default)]
    pub updated: i64,

    /// Every other attribute, carried opaquely.
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

impl Element {
    /// Create a fresh element at version 1.
    pub fn new(id: impl Into<ElementId>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            version: 1,
            version_nonce: 0,
            index: None,
            is_deleted: false,
            updated: 0,
            props: Map::new(),
        }
    }

    /// Set the version.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Set the version nonce.
    pub fn with_nonce(mut self, nonce: u32) -> Self {
        self.version_nonce = nonce;
        self
    }

    /// Set the fractional index.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Set the update timestamp.
    pub fn with_updated(mut self, updated: i64) -> Self {
        self.updated = updated;
        self
    }

    /// Mark as deleted.
    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }

    /// Set an opaque property.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Read a numeric property.
    pub fn number_prop(&self, key: &str) -> Option<f64> {
        self.props.get(key).and_then(Value::as_f64)
    }

    /// Whether this element is a linear element (line or arrow).
    pub fn is_linear(&self) -> bool {
        matches!(self.kind.as_str(), "line" | "arrow")
    }
}
