//! Restoration and syncable filtering of decrypted element sequences.
//!
//! Remote scenes come back as untyped JSON. [`restore_elements`] turns them
//! into well-formed [`Element`]s, and [`syncable_elements`] drops the ones
//! that should not travel over the wire anymore.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::element::Element;

/// How long a deleted element keeps syncing before it is dropped (24 h).
pub const DELETED_ELEMENT_TIMEOUT_MS: i64 = 24 * 60 * 60 * 1000;

/// Restore a raw element array into well-formed elements.
///
/// - Non-objects, entries without a non-empty string `id`, and entries that
///   fail to parse are dropped.
/// - Later duplicates of an id are dropped; the first occurrence wins.
/// - A `version` of 0 is bumped to 1.
pub fn restore_elements(raw: Vec<Value>) -> Vec<Element> {
    let mut seen = HashSet::new();
    let mut restored = Vec::with_capacity(raw.len());

    for value in raw {
        let has_id = value
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|id| !id.is_empty());
        if !has_id {
            debug!("dropping element without id");
            continue;
        }

        let mut element: Element = match serde_json::from_value(value) {
            Ok(element) => element,
            Err(e) => {
                debug!(error = %e, "dropping malformed element");
                continue;
            }
        };

        if !seen.insert(element.id.clone()) {
            debug!(element_id = %element.id, "dropping duplicate element");
            continue;
        }

        if element.version == 0 {
            element.version = 1;
        }

        restored.push(element);
    }

    restored
}

/// Whether an element is too small to be visible.
///
/// Linear and freedraw elements need at least two points; other elements
/// are invisible when both `width` and `height` are present and zero.
pub fn is_invisibly_small(element: &Element) -> bool {
    if element.is_linear() || element.kind == "freedraw" {
        return element
            .props
            .get("points")
            .and_then(Value::as_array)
            .map_or(true, |points| points.len() < 2);
    }

    matches!(
        (element.number_prop("width"), element.number_prop("height")),
        (Some(w), Some(h)) if w == 0.0 && h == 0.0
    )
}

/// Whether an element should be synced.
///
/// Deleted elements sync only while recently deleted, so collaborators
/// learn about the deletion. Live elements sync unless invisibly small.
pub fn is_syncable(element: &Element, now: i64, deleted_timeout_ms: i64) -> bool {
    if element.is_deleted {
        element.updated > now - deleted_timeout_ms
    } else {
        !is_invisibly_small(element)
    }
}

/// Filter a sequence down to syncable elements, keeping order.
pub fn syncable_elements(elements: Vec<Element>, now: i64, deleted_timeout_ms: i64) -> Vec<Element> {
    elements
        .into_iter()
        .filter(|e| is_syncable(e, now, deleted_timeout_ms))
        .collect()
}
