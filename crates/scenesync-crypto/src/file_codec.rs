//! Attachment payload codec.
//!
//! An uploaded attachment is a single opaque blob carrying the file content
//! together with its metadata, encrypted with the room key. [`FileCodec`]
//! is the seam for that format; [`EnvelopeFileCodec`] is the default.
//!
//! ## Envelope layout
//!
//! ```text
//! CBOR { format: u8, iv: [u8; 12], ciphertext: bytes }
//!   ciphertext = encrypt(CBOR { metadata: { mimeType?, created? }, data: bytes })
//! ```

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::cipher::{ChaChaCipher, SceneCipher};
use crate::error::{CryptoError, Result};
use crate::key::{Iv, RoomKey};

/// Metadata stored alongside an attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// MIME type of the original file.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Creation time (Unix ms).
    #[serde(default)]
    pub created: Option<i64>,
}

impl FileMetadata {
    /// Metadata with a MIME type and creation time.
    pub fn new(mime_type: impl Into<String>, created: i64) -> Self {
        Self {
            mime_type: Some(mime_type.into()),
            created: Some(created),
        }
    }
}

/// A decoded attachment payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFile {
    pub data: Vec<u8>,
    pub metadata: FileMetadata,
}

/// Encodes and decodes attachment payloads with a room key.
pub trait FileCodec: Send + Sync {
    /// Produce an upload payload.
    fn encode(&self, data: &[u8], metadata: &FileMetadata, key: &RoomKey) -> Result<Vec<u8>>;

    /// Recover content and metadata from a downloaded payload.
    fn decode(&self, payload: &[u8], key: &RoomKey) -> Result<DecodedFile>;
}

/// Format identifier for file envelopes.
const FORMAT_V1: u8 = 1;

#[derive(Serialize, Deserialize)]
struct FileEnvelope {
    format: u8,
    iv: Iv,
    ciphertext: Bytes,
}

#[derive(Serialize, Deserialize)]
struct FileContents {
    metadata: FileMetadata,
    data: Bytes,
}

/// CBOR envelope codec over a [`SceneCipher`].
///
/// Payloads are not compressed; embedders that need compression supply
/// their own [`FileCodec`].
#[derive(Clone)]
pub struct EnvelopeFileCodec {
    cipher: Arc<dyn SceneCipher>,
}

impl EnvelopeFileCodec {
    /// Codec using ChaCha20-Poly1305.
    pub fn new() -> Self {
        Self::with_cipher(Arc::new(ChaChaCipher))
    }

    /// Codec using a custom cipher.
    pub fn with_cipher(cipher: Arc<dyn SceneCipher>) -> Self {
        Self { cipher }
    }
}

impl Default for EnvelopeFileCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl FileCodec for EnvelopeFileCodec {
    fn encode(&self, data: &[u8], metadata: &FileMetadata, key: &RoomKey) -> Result<Vec<u8>> {
        let contents = FileContents {
            metadata: metadata.clone(),
            data: Bytes::copy_from_slice(data),
        };
        let plaintext = to_cbor(&contents)?;
        let encrypted = self.cipher.encrypt(key, &plaintext)?;

        to_cbor(&FileEnvelope {
            format: FORMAT_V1,
            iv: encrypted.iv,
            ciphertext: Bytes::from(encrypted.ciphertext),
        })
    }

    fn decode(&self, payload: &[u8], key: &RoomKey) -> Result<DecodedFile> {
        let envelope: FileEnvelope = from_cbor(payload)?;
        if envelope.format != FORMAT_V1 {
            return Err(CryptoError::SerializationError(format!(
                "unsupported file envelope format: {}",
                envelope.format
            )));
        }

        let plaintext = self
            .cipher
            .decrypt(&envelope.iv, &envelope.ciphertext, key)?;
        let contents: FileContents = from_cbor(&plaintext)?;

        Ok(DecodedFile {
            data: contents.data.to_vec(),
            metadata: contents.metadata,
        })
    }
}

fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf)
        .map_err(|e| CryptoError::SerializationError(e.to_string()))?;
    Ok(buf)
}

fn from_cbor<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| CryptoError::SerializationError(e.to_string()))
}
