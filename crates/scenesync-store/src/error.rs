//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Network error while talking to a remote backend.
    #[error("network error: {0}")]
    Network(String),

    /// Record or file not found where one was required.
    #[error("not found: {0}")]
    NotFound(String),

    /// A record already exists for this room.
    #[error("record already exists for room {0}")]
    Conflict(String),

    /// A URL could not be resolved by this backend.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Blocking task failed or was cancelled.
    #[error("task error: {0}")]
    Task(String),

    /// Any other backend failure (for custom providers).
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Database(_)
                | StoreError::Network(_)
                | StoreError::Task(_)
                | StoreError::Backend(_)
        )
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Network(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
