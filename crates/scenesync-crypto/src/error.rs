//! Error types for the crypto module.

use thiserror::Error;

/// Errors that can occur during encryption and decoding.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encryption error.
    #[error("encryption error: {0}")]
    EncryptionError(String),

    /// Decryption error (wrong key, tampered ciphertext, bad IV).
    #[error("decryption error: {0}")]
    DecryptionError(String),

    /// Key has the wrong length or encoding.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// IV has the wrong length.
    #[error("invalid iv length: expected 12, got {0}")]
    InvalidIv(usize),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Core error.
    #[error("core error: {0}")]
    CoreError(#[from] scenesync_core::CoreError),
}

/// Result type for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
