//! Error types for the sync module.

use thiserror::Error;

use scenesync_core::FileId;
use scenesync_crypto::CryptoError;
use scenesync_store::StoreError;

/// Errors that can occur during save, load and file transfer.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Storage provider failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Encryption, decryption or payload decoding failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Decrypted content was not in the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// The provider has no URL for this file.
    #[error("file not found: {0}")]
    FileMissing(FileId),

    /// Download of a file returned an error status.
    #[error("file download failed with status {0}")]
    FileStatus(u16),
}

/// Coarse classification of a [`SyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Retrying later may succeed.
    Transient,
    /// Stored data could not be decrypted or decoded.
    Corrupt,
    /// The provider refused the operation or the item does not exist.
    Rejected,
}

impl SyncError {
    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            SyncError::Store(e) if e.is_transient() => FailureKind::Transient,
            SyncError::Store(_) => FailureKind::Rejected,
            SyncError::Crypto(_) | SyncError::Decode(_) => FailureKind::Corrupt,
            SyncError::FileMissing(_) => FailureKind::Rejected,
            SyncError::FileStatus(status) if *status >= 500 || *status == 429 => {
                FailureKind::Transient
            }
            SyncError::FileStatus(_) => FailureKind::Rejected,
        }
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds() {
        assert_eq!(
            SyncError::from(StoreError::Network("reset".into())).kind(),
            FailureKind::Transient
        );
        assert_eq!(
            SyncError::from(StoreError::Conflict("r".into())).kind(),
            FailureKind::Rejected
        );
        assert_eq!(
            SyncError::from(CryptoError::DecryptionError("tag".into())).kind(),
            FailureKind::Corrupt
        );
        assert_eq!(SyncError::FileStatus(503).kind(), FailureKind::Transient);
        assert_eq!(SyncError::FileStatus(404).kind(), FailureKind::Rejected);
        assert_eq!(
            SyncError::FileMissing(FileId::new("f")).kind(),
            FailureKind::Rejected
        );
    }
}
