//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use tracing_subscriber::filter::LevelFilter;

use scenesync::store::MemoryProvider;
use scenesync::{SceneSync, SceneSyncConfig};
use scenesync_testkit::FaultyProvider;

/// Install a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(LevelFilter::DEBUG)
        .try_init();
}

/// A SceneSync over a counting, fault-injectable in-memory provider.
pub fn faulty_sync(
    config: SceneSyncConfig,
) -> (
    Arc<FaultyProvider<MemoryProvider>>,
    SceneSync<FaultyProvider<MemoryProvider>>,
) {
    let provider = Arc::new(FaultyProvider::new(Arc::new(MemoryProvider::new())));
    let sync = SceneSync::new(Arc::clone(&provider), config);
    (provider, sync)
}
