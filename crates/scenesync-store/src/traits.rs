//! Storage provider traits: the abstract interface for scene and file
//! persistence.
//!
//! The sync layer is storage-agnostic. Implementations include SQLite and
//! in-memory backends; embedding applications bring their own for hosted
//! services.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use scenesync_core::{FileId, RoomId, SceneVersion};

use crate::error::Result;

/// Backend-assigned identifier of a stored scene record.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RecordId(pub String);

impl RecordId {
    /// Create from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored scene as returned by [`StorageProvider::fetch_record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: RecordId,
    pub ciphertext: Vec<u8>,
    pub iv: Vec<u8>,
}

/// The data written on create and update.
///
/// Carries no key field: room keys never reach storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordData {
    pub room_id: RoomId,
    /// Non-authoritative hint; readers recompute from decrypted content.
    pub scene_version: SceneVersion,
    pub ciphertext: Vec<u8>,
    pub iv: Vec<u8>,
}

/// A binary attachment ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub mime_type: String,
    pub data: Bytes,
}

impl FileBlob {
    /// Wrap bytes with a MIME type.
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The StorageProvider trait: async interface for scene records and files.
///
/// # Design Notes
///
/// - **Absence is not an error**: missing records and files are `Ok(None)`.
/// - **One record per room**: `fetch_record` returns the room's record if any.
/// - **Files are immutable**: behaviour on re-uploading an existing
///   `(prefix, file_id)` is backend-defined; the bundled backends keep the
///   first upload.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Scene Records
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the record for a room.
    async fn fetch_record(&self, room_id: &RoomId) -> Result<Option<StoredRecord>>;

    /// Create the first record for a room.
    async fn create_record(&self, data: RecordData) -> Result<()>;

    /// Overwrite an existing record.
    async fn update_record(&self, record_id: &RecordId, data: RecordData) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Files
    // ─────────────────────────────────────────────────────────────────────────

    /// Upload a file blob under `prefix/file_id`.
    async fn save_file(&self, prefix: &str, file_id: &FileId, blob: FileBlob) -> Result<()>;

    /// Resolve a retrieval URL for `prefix/file_id`.
    async fn get_file_url(&self, prefix: &str, file_id: &FileId) -> Result<Option<String>>;
}

#[async_trait]
impl<P: StorageProvider + ?Sized> StorageProvider for Arc<P> {
    async fn fetch_record(&self, room_id: &RoomId) -> Result<Option<StoredRecord>> {
        (**self).fetch_record(room_id).await
    }

    async fn create_record(&self, data: RecordData) -> Result<()> {
        (**self).create_record(data).await
    }

    async fn update_record(&self, record_id: &RecordId, data: RecordData) -> Result<()> {
        (**self).update_record(record_id, data).await
    }

    async fn save_file(&self, prefix: &str, file_id: &FileId, blob: FileBlob) -> Result<()> {
        (**self).save_file(prefix, file_id, blob).await
    }

    async fn get_file_url(&self, prefix: &str, file_id: &FileId) -> Result<Option<String>> {
        (**self).get_file_url(prefix, file_id).await
    }
}

/// Response of a [`BlobFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Bytes,
}

impl FetchResponse {
    /// A 200 response.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// A 404 response with an empty body.
    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: Bytes::new(),
        }
    }

    /// Whether the status signals success (< 400).
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

/// Downloads the content behind a file URL.
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    /// Fetch `url`. Non-success statuses are returned, not raised.
    async fn fetch(&self, url: &str) -> Result<FetchResponse>;
}

#[async_trait]
impl<F: BlobFetcher + ?Sized> BlobFetcher for Arc<F> {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        (**self).fetch(url).await
    }
}

/// Build a `scheme://prefix/file_id` URL with the file id percent-encoded.
pub fn file_url(scheme: &str, prefix: &str, file_id: &FileId) -> String {
    format!(
        "{}://{}/{}",
        scheme,
        prefix,
        urlencoding::encode(file_id.as_str())
    )
}

/// Split a URL built by [`file_url`] into `(prefix, file_id)`.
///
/// The file id is everything after the last `/`, so prefixes may nest.
pub fn parse_file_url<'a>(scheme: &str, url: &'a str) -> Option<(&'a str, FileId)> {
    let rest = url.strip_prefix(scheme)?.strip_prefix("://")?;
    let (prefix, encoded) = rest.rsplit_once('/')?;
    let file_id = urlencoding::decode(encoded).ok()?;
    if file_id.is_empty() {
        return None;
    }
    Some((prefix, FileId::new(file_id.into_owned())))
}
