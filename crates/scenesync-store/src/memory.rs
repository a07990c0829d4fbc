//! In-memory implementation of the StorageProvider trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use scenesync_core::{FileId, RoomId};

use crate::error::{Result, StoreError};
use crate::traits::{
    self, parse_file_url, BlobFetcher, FetchResponse, FileBlob, RecordData, RecordId,
    StorageProvider, StoredRecord,
};

/// URL scheme served by [`MemoryProvider`]'s fetcher.
pub const MEMORY_SCHEME: &str = "memory";

/// In-memory provider implementation.
///
/// All data is lost when the provider is dropped. Thread-safe via RwLock.
pub struct MemoryProvider {
    inner: RwLock<MemoryProviderInner>,
}

#[derive(Default)]
struct MemoryProviderInner {
    /// Records indexed by room.
    records: HashMap<RoomId, (RecordId, RecordData)>,

    /// Record id -> room index.
    rooms_by_record: HashMap<RecordId, RoomId>,

    /// Files indexed by (prefix, file_id).
    files: HashMap<(String, FileId), FileBlob>,

    /// Counter for generated record ids.
    next_record: u64,
}

impl MemoryProvider {
    /// Create a new empty in-memory provider.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryProviderInner::default()),
        }
    }

    /// The last data written for a room, if any.
    pub fn record_data(&self, room_id: &RoomId) -> Option<RecordData> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.records.get(room_id).map(|(_, data)| data.clone())
    }

    /// Number of stored scene records.
    pub fn record_count(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.records.len()
    }

    /// A stored file, if any.
    pub fn file(&self, prefix: &str, file_id: &FileId) -> Option<FileBlob> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .files
            .get(&(prefix.to_string(), file_id.clone()))
            .cloned()
    }

    /// Number of stored files.
    pub fn file_count(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.files.len()
    }

    /// URL under which a file is served by this provider's fetcher.
    pub fn file_url(prefix: &str, file_id: &FileId) -> String {
        traits::file_url(MEMORY_SCHEME, prefix, file_id)
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageProvider for MemoryProvider {
    async fn fetch_record(&self, room_id: &RoomId) -> Result<Option<StoredRecord>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.records.get(room_id).map(|(id, data)| StoredRecord {
            id: id.clone(),
            ciphertext: data.ciphertext.clone(),
            iv: data.iv.clone(),
        }))
    }

    async fn create_record(&self, data: RecordData) -> Result<()> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if inner.records.contains_key(&data.room_id) {
            return Err(StoreError::Conflict(data.room_id.to_string()));
        }

        inner.next_record += 1;
        let record_id = RecordId::new(format!("rec-{}", inner.next_record));
        inner
            .rooms_by_record
            .insert(record_id.clone(), data.room_id.clone());
        inner.records.insert(data.room_id.clone(), (record_id, data));

        Ok(())
    }

    async fn update_record(&self, record_id: &RecordId, data: RecordData) -> Result<()> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        let room_id = inner
            .rooms_by_record
            .get(record_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("record {}", record_id)))?;

        // The record stays attached to the room it was created for.
        let data = RecordData { room_id: room_id.clone(), ..data };
        inner.records.insert(room_id, (record_id.clone(), data));

        Ok(())
    }

    async fn save_file(&self, prefix: &str, file_id: &FileId, blob: FileBlob) -> Result<()> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner
            .files
            .entry((prefix.to_string(), file_id.clone()))
            .or_insert(blob);
        Ok(())
    }

    async fn get_file_url(&self, prefix: &str, file_id: &FileId) -> Result<Option<String>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let exists = inner
            .files
            .contains_key(&(prefix.to_string(), file_id.clone()));
        Ok(exists.then(|| Self::file_url(prefix, file_id)))
    }
}

#[async_trait]
impl BlobFetcher for MemoryProvider {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let (prefix, file_id) = parse_file_url(MEMORY_SCHEME, url)
            .ok_or_else(|| StoreError::InvalidUrl(url.to_string()))?;

        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner
            .files
            .get(&(prefix.to_string(), file_id))
            .map(|blob| FetchResponse::ok(blob.data.clone()))
            .unwrap_or_else(FetchResponse::not_found))
    }
}
