//! Engine and file-sync configuration.

use serde::Deserialize;

use scenesync_core::{DELETED_ELEMENT_TIMEOUT_MS, MIME_BINARY};

/// Configuration for [`SyncEngine`](crate::SyncEngine).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Record the persisted scene version in the version cache after a
    /// successful save. When false only loads update the cache.
    pub record_version_on_save: bool,
    /// How long deleted elements keep being synced (ms).
    pub deleted_element_timeout_ms: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            record_version_on_save: true,
            deleted_element_timeout_ms: DELETED_ELEMENT_TIMEOUT_MS,
        }
    }
}

/// Configuration for [`FileSync`](crate::FileSync).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileSyncConfig {
    /// MIME type sent with every upload. Payloads are encrypted, so the
    /// real type travels inside them.
    pub upload_mime_type: String,
}

impl Default for FileSyncConfig {
    fn default() -> Self {
        Self {
            upload_mime_type: MIME_BINARY.to_string(),
        }
    }
}
