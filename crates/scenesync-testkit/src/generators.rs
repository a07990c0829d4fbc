//! Proptest generators for property-based testing.

use proptest::prelude::*;

use scenesync_core::{Element, ElementId, FileId};

/// Generate an element id.
pub fn element_id() -> impl Strategy<Value = ElementId> {
    "[a-zA-Z0-9_-]{1,21}".prop_map(ElementId::new)
}

/// Generate a file id.
pub fn file_id() -> impl Strategy<Value = FileId> {
    "[a-f0-9]{8,40}".prop_map(FileId::new)
}

/// Generate an element version (never 0).
pub fn version() -> impl Strategy<Value = u64> {
    1u64..=10_000
}

/// Generate an element type.
pub fn element_kind() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("rectangle"),
        Just("ellipse"),
        Just("diamond"),
        Just("text"),
        Just("image"),
        Just("frame"),
    ]
}

/// Generate a visible, live element with the given id and index.
pub fn element_with(id: ElementId, index: String) -> impl Strategy<Value = Element> {
    (element_kind(), version(), any::<u32>(), 1u32..500, 1u32..500).prop_map(
        move |(kind, version, nonce, width, height)| {
            Element::new(id.clone(), kind)
                .with_version(version)
                .with_nonce(nonce)
                .with_index(index.clone())
                .with_prop("width", width)
                .with_prop("height", height)
        },
    )
}

/// Generate a scene of up to `max_len` elements with unique ids in
/// index order.
pub fn scene(max_len: usize) -> impl Strategy<Value = Vec<Element>> {
    prop::collection::hash_set(element_id(), 0..=max_len).prop_flat_map(|ids| {
        ids.into_iter()
            .enumerate()
            .map(|(i, id)| element_with(id, format!("a{i:04}")))
            .collect::<Vec<_>>()
    })
}

/// Generate a list of file ids that may contain duplicates.
pub fn file_ids_with_duplicates(max_unique: usize) -> impl Strategy<Value = Vec<FileId>> {
    prop::collection::vec(file_id(), 1..=max_unique).prop_flat_map(|unique| {
        let len = unique.len();
        prop::collection::vec(0..len, len..=len * 3).prop_map(move |picks| {
            let mut ids = unique.clone();
            ids.extend(picks.into_iter().map(|i| unique[i].clone()));
            ids
        })
    })
}
