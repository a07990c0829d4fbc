//! Fault injection and call counting around a storage provider.
//!
//! [`FaultyProvider`] forwards to an inner provider, counts every call per
//! operation, and fails whichever operations (or individual files) a test
//! switches on. Injected failures are `StoreError::Backend`.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use scenesync_core::{FileId, RoomId};
use scenesync_store::{
    BlobFetcher, FetchResponse, FileBlob, RecordData, RecordId, Result, StorageProvider,
    StoreError, StoredRecord,
};

/// A provider or fetcher operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FetchRecord,
    CreateRecord,
    UpdateRecord,
    SaveFile,
    GetFileUrl,
    Fetch,
}

impl Op {
    const ALL: [Op; 6] = [
        Op::FetchRecord,
        Op::CreateRecord,
        Op::UpdateRecord,
        Op::SaveFile,
        Op::GetFileUrl,
        Op::Fetch,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Default)]
struct Faults {
    ops: HashSet<Op>,
    file_saves: HashSet<FileId>,
    file_urls: HashSet<FileId>,
}

/// Wraps a provider with switchable failures and per-operation counters.
pub struct FaultyProvider<P> {
    inner: Arc<P>,
    faults: RwLock<Faults>,
    calls: [AtomicUsize; 6],
}

impl<P> FaultyProvider<P> {
    /// Wrap a provider with every operation healthy.
    pub fn new(inner: Arc<P>) -> Self {
        Self {
            inner,
            faults: RwLock::new(Faults::default()),
            calls: Default::default(),
        }
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &Arc<P> {
        &self.inner
    }

    /// Make every call of `op` fail.
    pub fn fail(&self, op: Op) {
        self.faults_mut().ops.insert(op);
    }

    /// Make `op` succeed again.
    pub fn heal(&self, op: Op) {
        self.faults_mut().ops.remove(&op);
    }

    /// Make uploads of one file fail.
    pub fn fail_file_save(&self, id: impl Into<FileId>) {
        self.faults_mut().file_saves.insert(id.into());
    }

    /// Make URL resolution of one file fail.
    pub fn fail_file_url(&self, id: impl Into<FileId>) {
        self.faults_mut().file_urls.insert(id.into());
    }

    /// Number of calls made to `op`.
    pub fn calls(&self, op: Op) -> usize {
        self.calls[op.slot()].load(Ordering::SeqCst)
    }

    /// Number of calls across all operations.
    pub fn total_calls(&self) -> usize {
        Op::ALL.iter().map(|op| self.calls(*op)).sum()
    }

    /// Reset every counter to zero.
    pub fn reset_calls(&self) {
        for counter in &self.calls {
            counter.store(0, Ordering::SeqCst);
        }
    }

    fn faults_mut(&self) -> std::sync::RwLockWriteGuard<'_, Faults> {
        self.faults.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, op: Op) -> Result<()> {
        self.calls[op.slot()].fetch_add(1, Ordering::SeqCst);
        let faults = self.faults.read().unwrap_or_else(PoisonError::into_inner);
        if faults.ops.contains(&op) {
            return Err(injected(op, None));
        }
        Ok(())
    }

    fn file_fault(&self, op: Op, id: &FileId) -> Result<()> {
        let faults = self.faults.read().unwrap_or_else(PoisonError::into_inner);
        let hit = match op {
            Op::SaveFile => faults.file_saves.contains(id),
            Op::GetFileUrl => faults.file_urls.contains(id),
            _ => false,
        };
        if hit {
            return Err(injected(op, Some(id)));
        }
        Ok(())
    }
}

fn injected(op: Op, id: Option<&FileId>) -> StoreError {
    match id {
        Some(id) => StoreError::Backend(format!("injected fault: {:?} {}", op, id)),
        None => StoreError::Backend(format!("injected fault: {:?}", op)),
    }
}

#[async_trait]
impl<P: StorageProvider> StorageProvider for FaultyProvider<P> {
    async fn fetch_record(&self, room_id: &RoomId) -> Result<Option<StoredRecord>> {
        self.enter(Op::FetchRecord)?;
        self.inner.fetch_record(room_id).await
    }

    async fn create_record(&self, data: RecordData) -> Result<()> {
        self.enter(Op::CreateRecord)?;
        self.inner.create_record(data).await
    }

    async fn update_record(&self, record_id: &RecordId, data: RecordData) -> Result<()> {
        self.enter(Op::UpdateRecord)?;
        self.inner.update_record(record_id, data).await
    }

    async fn save_file(&self, prefix: &str, file_id: &FileId, blob: FileBlob) -> Result<()> {
        self.enter(Op::SaveFile)?;
        self.file_fault(Op::SaveFile, file_id)?;
        self.inner.save_file(prefix, file_id, blob).await
    }

    async fn get_file_url(&self, prefix: &str, file_id: &FileId) -> Result<Option<String>> {
        self.enter(Op::GetFileUrl)?;
        self.file_fault(Op::GetFileUrl, file_id)?;
        self.inner.get_file_url(prefix, file_id).await
    }
}

#[async_trait]
impl<P: BlobFetcher> BlobFetcher for FaultyProvider<P> {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        self.enter(Op::Fetch)?;
        self.inner.fetch(url).await
    }
}
