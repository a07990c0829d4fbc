//! Error types for SceneSync Core.

use thiserror::Error;

/// Core errors that can occur while encoding or decoding scenes.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),

    #[error("scene payload is not an element array")]
    NotAnArray,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
