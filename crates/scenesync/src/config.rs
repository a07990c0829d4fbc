//! Top-level configuration.

use serde::Deserialize;

use scenesync_sync::{FileSyncConfig, SyncConfig};

use crate::error::Result;

/// Configuration for [`SceneSync`](crate::SceneSync).
///
/// Every field is optional in JSON; missing fields take their defaults.
///
/// ```rust
/// use scenesync::SceneSyncConfig;
///
/// let config = SceneSyncConfig::from_json_str(
///     r#"{ "sync": { "deleted_element_timeout_ms": 3600000 } }"#,
/// )
/// .unwrap();
/// assert_eq!(config.sync.deleted_element_timeout_ms, 3_600_000);
/// assert!(config.sync.record_version_on_save);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SceneSyncConfig {
    /// Scene save/load settings.
    pub sync: SyncConfig,
    /// Attachment settings.
    pub files: FileSyncConfig,
}

impl SceneSyncConfig {
    /// Parse configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneSyncError;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(
            SceneSyncConfig::from_json_str("{}").unwrap(),
            SceneSyncConfig::default()
        );
    }

    #[test]
    fn test_overrides() {
        let config = SceneSyncConfig::from_json_str(
            r#"{
                "sync": { "record_version_on_save": false },
                "files": { "upload_mime_type": "application/x-scenesync" }
            }"#,
        )
        .unwrap();

        assert!(!config.sync.record_version_on_save);
        assert_eq!(config.files.upload_mime_type, "application/x-scenesync");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            SceneSyncConfig::from_json_str("{ not json"),
            Err(SceneSyncError::Config(_))
        ));
    }
}
