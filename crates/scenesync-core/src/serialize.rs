//! Scene serialization.
//!
//! Scenes are serialized as a UTF-8 JSON array of elements, which is what
//! other collaborators on the same room expect to decrypt.

use serde_json::Value;

use crate::element::Element;
use crate::error::{CoreError, Result};

/// Serialize an element sequence to JSON bytes.
pub fn scene_to_json(elements: &[Element]) -> Result<Vec<u8>> {
    serde_json::to_vec(elements).map_err(|e| CoreError::EncodingError(e.to_string()))
}

/// Parse JSON bytes into raw (unrestored) element values.
///
/// The top level must be an array; individual entries are left untyped so
/// that [`crate::restore_elements`] can decide what to keep.
pub fn scene_from_json(bytes: &[u8]) -> Result<Vec<Value>> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    match value {
        Value::Array(items) => Ok(items),
        _ => Err(CoreError::NotAnArray),
    }
}
