//! Version cache: the last scene version known to be saved, per transport.
//!
//! Entries hold only a `Weak` reference to their transport. Once the session
//! drops its transport the entry can never be read again, and it is pruned on
//! the next write.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tracing::trace;

use scenesync_core::{Element, SceneVersion};

use crate::session::{TransportHandle, TransportId};

struct CacheEntry {
    transport: Weak<TransportHandle>,
    version: SceneVersion,
}

/// Maps live transports to their last saved scene version.
#[derive(Default)]
pub struct VersionCache {
    entries: RwLock<HashMap<TransportId, CacheEntry>>,
}

impl VersionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last recorded scene version for a transport.
    pub fn get(&self, transport: &Arc<TransportHandle>) -> Option<SceneVersion> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&transport.id())
            .filter(|entry| entry.transport.strong_count() > 0)
            .map(|entry| entry.version)
    }

    /// Compute and record the scene version of `elements`.
    pub fn set(&self, transport: &Arc<TransportHandle>, elements: &[Element]) -> SceneVersion {
        let version = SceneVersion::of(elements);
        self.record(transport, version);
        version
    }

    /// Record an already computed scene version.
    pub fn record(&self, transport: &Arc<TransportHandle>, version: SceneVersion) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| entry.transport.strong_count() > 0);
        entries.insert(
            transport.id(),
            CacheEntry {
                transport: Arc::downgrade(transport),
                version,
            },
        );
        trace!(transport = %transport.id(), %version, "recorded scene version");
    }

    /// Drop the entry for a transport.
    pub fn forget(&self, transport: &Arc<TransportHandle>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&transport.id());
    }

    /// Remove entries whose transport has been dropped.
    pub fn prune(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| entry.transport.strong_count() > 0);
    }

    /// Number of entries whose transport is still alive.
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .values()
            .filter(|entry| entry.transport.strong_count() > 0)
            .count()
    }

    /// Whether no live entries remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
