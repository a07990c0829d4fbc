//! Batched attachment upload and download.
//!
//! Every item in a batch runs concurrently and fails on its own: one bad
//! file never blocks or fails the others. There is no retry here; callers
//! resubmit the errored ids.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use tracing::{debug, warn};

use scenesync_core::{now_millis, BinaryFileData, DataUrl, FileId, MIME_BINARY};
use scenesync_crypto::{EnvelopeFileCodec, FileCodec, FileMetadata, RoomKey};
use scenesync_store::{BlobFetcher, FileBlob, StorageProvider};

use crate::config::FileSyncConfig;
use crate::error::{Result, SyncError};

/// One file to upload: an id and an already encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub id: FileId,
    pub data: Bytes,
}

impl FileUpload {
    pub fn new(id: impl Into<FileId>, data: impl Into<Bytes>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }
}

/// Outcome of [`FileSync::save_files`], in input order.
#[derive(Debug, Default)]
pub struct FileSaveReport {
    pub saved_files: Vec<FileId>,
    pub errored_files: Vec<(FileId, SyncError)>,
}

impl FileSaveReport {
    /// Ids that failed to upload.
    pub fn errored_ids(&self) -> Vec<&FileId> {
        self.errored_files.iter().map(|(id, _)| id).collect()
    }
}

/// Outcome of [`FileSync::load_files`].
///
/// `loaded_files` follows the first-occurrence order of the requested ids.
#[derive(Debug, Default)]
pub struct FileLoadReport {
    pub loaded_files: Vec<BinaryFileData>,
    pub errored_files: BTreeMap<FileId, SyncError>,
}

impl FileLoadReport {
    /// Ids that failed to load.
    pub fn errored_ids(&self) -> HashSet<FileId> {
        self.errored_files.keys().cloned().collect()
    }
}

/// Uploads and downloads room attachments.
pub struct FileSync<P> {
    provider: Arc<P>,
    fetcher: Arc<dyn BlobFetcher>,
    codec: Arc<dyn FileCodec>,
    config: FileSyncConfig,
}

impl<P: StorageProvider> FileSync<P> {
    /// Create a file sync over a provider and a fetcher for its URLs.
    pub fn new(provider: Arc<P>, fetcher: Arc<dyn BlobFetcher>, config: FileSyncConfig) -> Self {
        Self {
            provider,
            fetcher,
            codec: Arc::new(EnvelopeFileCodec::new()),
            config,
        }
    }

    /// Use a custom payload codec.
    pub fn with_codec(mut self, codec: Arc<dyn FileCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Encode content and metadata into an upload payload.
    pub fn encode_file(
        &self,
        data: &[u8],
        metadata: &FileMetadata,
        key: &RoomKey,
    ) -> Result<Vec<u8>> {
        Ok(self.codec.encode(data, metadata, key)?)
    }

    /// Upload a batch of files under `prefix`.
    pub async fn save_files(&self, prefix: &str, files: Vec<FileUpload>) -> FileSaveReport {
        let uploads = files.into_iter().map(|file| async move {
            let blob = FileBlob::new(file.data, self.config.upload_mime_type.clone());
            let result = self.provider.save_file(prefix, &file.id, blob).await;
            (file.id, result)
        });

        let mut report = FileSaveReport::default();
        for (id, result) in join_all(uploads).await {
            match result {
                Ok(()) => report.saved_files.push(id),
                Err(e) => {
                    warn!(prefix, file_id = %id, error = %e, "failed to upload file");
                    report.errored_files.push((id, e.into()));
                }
            }
        }

        debug!(
            prefix,
            saved = report.saved_files.len(),
            errored = report.errored_files.len(),
            "saved files"
        );
        report
    }

    /// Download and decode a batch of files from `prefix`.
    ///
    /// Duplicate ids are fetched once.
    pub async fn load_files(&self, prefix: &str, key: &RoomKey, ids: &[FileId]) -> FileLoadReport {
        let mut seen = HashSet::with_capacity(ids.len());
        let unique: Vec<&FileId> = ids.iter().filter(|id| seen.insert(*id)).collect();

        let loads = unique.into_iter().map(|id| async move {
            let result = self.load_one(prefix, key, id).await;
            (id, result)
        });

        let mut report = FileLoadReport::default();
        for (id, result) in join_all(loads).await {
            match result {
                Ok(file) => report.loaded_files.push(file),
                Err(e) => {
                    warn!(prefix, file_id = %id, error = %e, "failed to load file");
                    report.errored_files.insert(id.clone(), e);
                }
            }
        }

        debug!(
            prefix,
            loaded = report.loaded_files.len(),
            errored = report.errored_files.len(),
            "loaded files"
        );
        report
    }

    async fn load_one(&self, prefix: &str, key: &RoomKey, id: &FileId) -> Result<BinaryFileData> {
        let url = self
            .provider
            .get_file_url(prefix, id)
            .await?
            .ok_or_else(|| SyncError::FileMissing(id.clone()))?;

        let response = self.fetcher.fetch(&url).await?;
        if !response.is_success() {
            return Err(SyncError::FileStatus(response.status));
        }

        let decoded = self.codec.decode(&response.body, key)?;
        let data_url = String::from_utf8(decoded.data)
            .map_err(|e| SyncError::Decode(format!("file content is not a utf-8 data url: {}", e)))?;

        let created = decoded
            .metadata
            .created
            .filter(|created| *created > 0)
            .unwrap_or_else(now_millis);
        Ok(BinaryFileData {
            id: id.clone(),
            mime_type: decoded
                .metadata
                .mime_type
                .unwrap_or_else(|| MIME_BINARY.to_string()),
            data_url: DataUrl::new(data_url),
            created,
            last_retrieved: created,
        })
    }
}
