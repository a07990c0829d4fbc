//! Reconciliation of local and remote element sequences.
//!
//! When a save finds an existing record, the stored scene and the local
//! scene are merged element by element. The merged sequence has unique ids
//! and is ordered by fractional index.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use scenesync_core::{Element, ElementId};

/// Editor state that influences reconciliation.
///
/// Elements the local user is actively manipulating (editing text, resizing,
/// drawing) always keep their local state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmbientState {
    pub active_elements: HashSet<ElementId>,
}

impl AmbientState {
    /// Ambient state with no active elements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an element as actively manipulated.
    pub fn with_active(mut self, id: impl Into<ElementId>) -> Self {
        self.active_elements.insert(id.into());
        self
    }

    /// Whether an element is actively manipulated.
    pub fn is_active(&self, id: &ElementId) -> bool {
        self.active_elements.contains(id)
    }
}

/// Merges local and remote element sequences.
///
/// Implementations must be pure and must return a sequence with unique ids.
pub trait Reconciler: Send + Sync {
    fn reconcile(
        &self,
        local: &[Element],
        remote: Vec<Element>,
        ambient: &AmbientState,
    ) -> Vec<Element>;
}

/// Version-based reconciliation.
///
/// For an id present on both sides the local element wins when it is
/// active, has a higher version, or has the same version and a nonce no
/// greater than the remote one. Elements present on one side only are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionReconciler;

impl VersionReconciler {
    /// Whether the remote copy of an element should be discarded.
    pub fn keep_local(local: &Element, remote: &Element, ambient: &AmbientState) -> bool {
        ambient.is_active(&local.id)
            || local.version > remote.version
            || (local.version == remote.version && local.version_nonce <= remote.version_nonce)
    }
}

impl Reconciler for VersionReconciler {
    fn reconcile(
        &self,
        local: &[Element],
        remote: Vec<Element>,
        ambient: &AmbientState,
    ) -> Vec<Element> {
        let local_by_id: HashMap<&ElementId, &Element> =
            local.iter().map(|el| (&el.id, el)).collect();

        let mut seen: HashSet<ElementId> = HashSet::with_capacity(local.len() + remote.len());
        let mut merged = Vec::with_capacity(local.len() + remote.len());

        for remote_el in remote {
            if !seen.insert(remote_el.id.clone()) {
                continue;
            }
            match local_by_id.get(&remote_el.id) {
                Some(local_el) if Self::keep_local(local_el, &remote_el, ambient) => {
                    merged.push((*local_el).clone());
                }
                _ => merged.push(remote_el),
            }
        }

        for local_el in local {
            if seen.insert(local_el.id.clone()) {
                merged.push(local_el.clone());
            }
        }

        // Stable: elements without an index keep their relative order at the end.
        merged.sort_by(|a, b| compare_index(a.index.as_deref(), b.index.as_deref()));
        merged
    }
}

fn compare_index(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
