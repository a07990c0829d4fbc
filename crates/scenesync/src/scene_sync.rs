//! SceneSync: one provider, one configuration, scenes and attachments.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use scenesync_core::{Element, FileId, RoomId};
use scenesync_crypto::{FileMetadata, RoomKey};
use scenesync_store::{BlobFetcher, MemoryProvider, SqliteProvider, StorageProvider};
use scenesync_sync::{
    AmbientState, FileLoadReport, FileSaveReport, FileSync, FileUpload, SaveOutcome, Session,
    SyncEngine,
};

use crate::config::SceneSyncConfig;
use crate::error::Result;

/// The main SceneSync struct.
///
/// Bundles a [`SyncEngine`] and a [`FileSync`] over one shared provider.
pub struct SceneSync<P> {
    provider: Arc<P>,
    engine: SyncEngine<P>,
    files: FileSync<P>,
}

impl<P: StorageProvider + BlobFetcher + 'static> SceneSync<P> {
    /// Create over a provider that also serves its own file URLs.
    pub fn new(provider: Arc<P>, config: SceneSyncConfig) -> Self {
        let fetcher: Arc<dyn BlobFetcher> = provider.clone();
        Self::with_fetcher(provider, fetcher, config)
    }
}

impl<P: StorageProvider> SceneSync<P> {
    /// Create over a provider and a separate fetcher for its file URLs.
    pub fn with_fetcher(
        provider: Arc<P>,
        fetcher: Arc<dyn BlobFetcher>,
        config: SceneSyncConfig,
    ) -> Self {
        Self {
            engine: SyncEngine::new(Arc::clone(&provider), config.sync),
            files: FileSync::new(Arc::clone(&provider), fetcher, config.files),
            provider,
        }
    }

    /// The shared provider.
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// The scene engine.
    pub fn engine(&self) -> &SyncEngine<P> {
        &self.engine
    }

    /// The attachment sync.
    pub fn files(&self) -> &FileSync<P> {
        &self.files
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scenes
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether `elements` still need saving through this session.
    pub fn is_dirty(&self, session: &Session, elements: &[Element]) -> bool {
        self.engine.is_dirty(session, elements)
    }

    /// Save a scene; `None` when skipped or failed.
    pub async fn save(
        &self,
        session: &Session,
        elements: &[Element],
        ambient: &AmbientState,
    ) -> Option<Vec<Element>> {
        self.engine.save(session, elements, ambient).await
    }

    /// Save a scene, reporting the outcome.
    pub async fn try_save(
        &self,
        session: &Session,
        elements: &[Element],
        ambient: &AmbientState,
    ) -> Result<SaveOutcome> {
        Ok(self.engine.try_save(session, elements, ambient).await?)
    }

    /// Load a room's scene; `None` when absent or failed.
    pub async fn load(
        &self,
        room_id: &RoomId,
        room_key: &RoomKey,
        session: Option<&Session>,
    ) -> Option<Vec<Element>> {
        self.engine.load(room_id, room_key, session).await
    }

    /// Load a room's scene, separating absence from failure.
    pub async fn try_load(
        &self,
        room_id: &RoomId,
        room_key: &RoomKey,
        session: Option<&Session>,
    ) -> Result<Option<Vec<Element>>> {
        Ok(self.engine.try_load(room_id, room_key, session).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Files
    // ─────────────────────────────────────────────────────────────────────────

    /// Encode an attachment for upload.
    pub fn encode_file(
        &self,
        data: &[u8],
        metadata: &FileMetadata,
        key: &RoomKey,
    ) -> Result<Vec<u8>> {
        Ok(self.files.encode_file(data, metadata, key)?)
    }

    /// Upload attachments under `prefix`.
    pub async fn save_files(&self, prefix: &str, files: Vec<FileUpload>) -> FileSaveReport {
        self.files.save_files(prefix, files).await
    }

    /// Download attachments from `prefix`.
    pub async fn load_files(&self, prefix: &str, key: &RoomKey, ids: &[FileId]) -> FileLoadReport {
        self.files.load_files(prefix, key, ids).await
    }
}

impl SceneSync<SqliteProvider> {
    /// Open a SQLite-backed instance at `path`.
    pub fn open(path: impl AsRef<Path>, config: SceneSyncConfig) -> Result<Self> {
        let path = path.as_ref();
        let provider = SqliteProvider::open(path)?;
        debug!(path = %path.display(), "opened scene store");
        Ok(Self::new(Arc::new(provider), config))
    }
}

impl SceneSync<MemoryProvider> {
    /// An instance with nothing persisted.
    pub fn in_memory(config: SceneSyncConfig) -> Self {
        Self::new(Arc::new(MemoryProvider::new()), config)
    }
}
