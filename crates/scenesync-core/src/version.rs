//! Scene versions: cheap, deterministic summaries of an element sequence.
//!
//! The scene version feeds the dirty check. Only the ordered `(id, version)`
//! pairs contribute; any other attribute can change without affecting it,
//! because every real edit bumps the element version anyway.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::element::Element;

/// Domain separator for scene version hashing.
const SCENE_VERSION_DOMAIN: &[u8] = b"scenesync-scene-version-v0:";

/// A 64-bit summary of an ordered element sequence.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneVersion(pub u64);

impl SceneVersion {
    /// Compute the scene version of an element sequence.
    ///
    /// Algorithm:
    /// 1. H = Blake3(domain)
    /// 2. For each element in order: H.update(len(id) || id || version)
    /// 3. Return the first 8 bytes of H, little-endian
    pub fn of(elements: &[Element]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(SCENE_VERSION_DOMAIN);

        for element in elements {
            let id = element.id.as_str().as_bytes();
            hasher.update(&(id.len() as u64).to_le_bytes());
            hasher.update(id);
            hasher.update(&element.version.to_le_bytes());
        }

        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        Self(u64::from_le_bytes(head))
    }
}

impl fmt::Debug for SceneVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SceneVersion({:016x})", self.0)
    }
}

impl fmt::Display for SceneVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn el(id: &str, version: u64) -> Element {
        Element::new(id, "rectangle").with_version(version)
    }

    #[test]
    fn test_identical_sequences_same_version() {
        let a = vec![el("a", 1), el("b", 2)];
        let b = vec![el("a", 1), el("b", 2)];
        assert_eq!(SceneVersion::of(&a), SceneVersion::of(&b));
    }

    #[test]
    fn test_metadata_does_not_contribute() {
        let plain = vec![el("a", 1)];
        let decorated = vec![el("a", 1)
            .with_nonce(42)
            .with_index("a5")
            .with_prop("x", 100)
            .with_prop("strokeColor", "#fff")];
        assert_eq!(SceneVersion::of(&plain), SceneVersion::of(&decorated));
    }

    #[test]
    fn test_reorder_changes_version() {
        let ab = vec![el("a", 1), el("b", 1)];
        let ba = vec![el("b", 1), el("a", 1)];
        assert_ne!(SceneVersion::of(&ab), SceneVersion::of(&ba));
    }

    #[test]
    fn test_version_bump_changes_version() {
        assert_ne!(SceneVersion::of(&[el("a", 1)]), SceneVersion::of(&[el("a", 2)]));
    }

    #[test]
    fn test_id_boundaries_are_unambiguous() {
        // "ab"+"c" must not collide with "a"+"bc".
        let left = vec![el("ab", 1), el("c", 1)];
        let right = vec![el("a", 1), el("bc", 1)];
        assert_ne!(SceneVersion::of(&left), SceneVersion::of(&right));
    }

    proptest! {
        #[test]
        fn prop_version_ignores_props(
            ids in prop::collection::btree_set("[a-z]{1,8}", 1..8),
            x in any::<i32>(),
        ) {
            let bare: Vec<Element> = ids.iter().map(|id| el(id, 3)).collect();
            let styled: Vec<Element> = ids
                .iter()
                .map(|id| el(id, 3).with_prop("x", x).with_nonce(x as u32))
                .collect();
            prop_assert_eq!(SceneVersion::of(&bare), SceneVersion::of(&styled));
        }

        #[test]
        fn prop_swapping_distinct_elements_changes_version(
            ids in prop::collection::btree_set("[a-z]{1,8}", 2..8),
        ) {
            let elements: Vec<Element> = ids.iter().map(|id| el(id, 1)).collect();
            let mut swapped = elements.clone();
            swapped.swap(0, 1);
            prop_assert_ne!(SceneVersion::of(&elements), SceneVersion::of(&swapped));
        }
    }
}
