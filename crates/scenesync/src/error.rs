//! Error types for the SceneSync facade.

use scenesync_store::StoreError;
use scenesync_sync::SyncError;
use thiserror::Error;

/// Errors that can occur while setting up or using [`SceneSync`](crate::SceneSync).
#[derive(Debug, Error)]
pub enum SceneSyncError {
    /// Sync error.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// Storage error (opening a backend).
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for SceneSync operations.
pub type Result<T> = std::result::Result<T, SceneSyncError>;
