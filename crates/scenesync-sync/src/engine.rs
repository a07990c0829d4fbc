//! The sync engine: dirty check, save and load of encrypted scenes.
//!
//! ## Save
//!
//! ```text
//! skip? ── no room / key / live transport, or scene unchanged ──> None
//!   │
//!   ├─ fetch existing record
//!   ├─ encrypt local scene, compute its scene version
//!   ├─ record exists:  decrypt remote, reconcile, update record  -> merged
//!   └─ no record:      create record                             -> local
//! ```
//!
//! The record is always written with the *local* ciphertext. The merged
//! sequence is returned so the caller can apply remote changes to its scene.

use std::sync::Arc;

use tracing::{debug, error, info};

use scenesync_core::{now_millis, restore_elements, syncable_elements, Element, RoomId, SceneVersion};
use scenesync_crypto::{decrypt_elements, encrypt_elements, ChaChaCipher, RoomKey, SceneCipher};
use scenesync_store::{RecordData, StorageProvider, StoredRecord};

use crate::cache::VersionCache;
use crate::config::SyncConfig;
use crate::error::Result;
use crate::reconcile::{AmbientState, Reconciler, VersionReconciler};
use crate::session::{Session, TransportHandle};

/// Why a save did not touch storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The session is not in a room.
    NoRoom,
    /// The session has no room key.
    NoKey,
    /// The transport is missing or disconnected.
    NoLiveTransport,
    /// The scene version matches the last saved one.
    Clean,
}

/// Result of [`SyncEngine::try_save`].
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Nothing was written.
    Skipped(SkipReason),
    /// A first record was created for the room.
    Created { elements: Vec<Element> },
    /// The existing record was overwritten; `merged` reconciles both sides.
    Updated { merged: Vec<Element> },
}

impl SaveOutcome {
    /// The elements the caller should adopt, if anything was saved.
    pub fn into_elements(self) -> Option<Vec<Element>> {
        match self {
            SaveOutcome::Skipped(_) => None,
            SaveOutcome::Created { elements } => Some(elements),
            SaveOutcome::Updated { merged } => Some(merged),
        }
    }

    /// Whether a record was written.
    pub fn is_saved(&self) -> bool {
        !matches!(self, SaveOutcome::Skipped(_))
    }
}

/// Saves and loads encrypted scenes through a [`StorageProvider`].
pub struct SyncEngine<P> {
    provider: Arc<P>,
    reconciler: Arc<dyn Reconciler>,
    cipher: Arc<dyn SceneCipher>,
    cache: VersionCache,
    config: SyncConfig,
}

impl<P: StorageProvider> SyncEngine<P> {
    /// Create an engine with version-based reconciliation and ChaCha20-Poly1305.
    pub fn new(provider: Arc<P>, config: SyncConfig) -> Self {
        Self {
            provider,
            reconciler: Arc::new(VersionReconciler),
            cipher: Arc::new(ChaChaCipher),
            cache: VersionCache::new(),
            config,
        }
    }

    /// Use a custom reconciler.
    pub fn with_reconciler(mut self, reconciler: Arc<dyn Reconciler>) -> Self {
        self.reconciler = reconciler;
        self
    }

    /// Use a custom cipher.
    pub fn with_cipher(mut self, cipher: Arc<dyn SceneCipher>) -> Self {
        self.cipher = cipher;
        self
    }

    /// The underlying provider.
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// The version cache.
    pub fn cache(&self) -> &VersionCache {
        &self.cache
    }

    /// The engine configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Whether `elements` differ from what was last saved or loaded through
    /// this session's transport.
    ///
    /// A session that cannot save (no room, key or live transport) is never
    /// dirty.
    pub fn is_dirty(&self, session: &Session, elements: &[Element]) -> bool {
        if session.room().is_none() || session.room_key.is_none() {
            return false;
        }
        match session.live_transport() {
            Some(transport) => self.cache.get(transport) != Some(SceneVersion::of(elements)),
            None => false,
        }
    }

    /// Save a scene, reporting what happened or why it failed.
    pub async fn try_save(
        &self,
        session: &Session,
        elements: &[Element],
        ambient: &AmbientState,
    ) -> Result<SaveOutcome> {
        let Some(room_id) = session.room() else {
            return Ok(SaveOutcome::Skipped(SkipReason::NoRoom));
        };
        let Some(room_key) = &session.room_key else {
            return Ok(SaveOutcome::Skipped(SkipReason::NoKey));
        };
        let Some(transport) = session.live_transport() else {
            return Ok(SaveOutcome::Skipped(SkipReason::NoLiveTransport));
        };
        if !self.is_dirty(session, elements) {
            return Ok(SaveOutcome::Skipped(SkipReason::Clean));
        }

        let existing = self.provider.fetch_record(room_id).await?;

        let encrypted = encrypt_elements(self.cipher.as_ref(), room_key, elements)?;
        let scene_version = SceneVersion::of(elements);
        let data = RecordData {
            room_id: room_id.clone(),
            scene_version,
            ciphertext: encrypted.ciphertext,
            iv: encrypted.iv.as_bytes().to_vec(),
        };

        let outcome = match existing {
            Some(record) => {
                let remote = self.decode_record(room_key, &record)?;
                let merged = self.reconciler.reconcile(elements, remote, ambient);
                let merged = syncable_elements(
                    merged,
                    now_millis(),
                    self.config.deleted_element_timeout_ms,
                );

                self.provider.update_record(&record.id, data).await?;
                info!(
                    room_id = %room_id,
                    record_id = %record.id,
                    %scene_version,
                    elements = elements.len(),
                    merged = merged.len(),
                    "updated scene record"
                );
                SaveOutcome::Updated { merged }
            }
            None => {
                self.provider.create_record(data).await?;
                info!(
                    room_id = %room_id,
                    %scene_version,
                    elements = elements.len(),
                    "created scene record"
                );
                SaveOutcome::Created {
                    elements: elements.to_vec(),
                }
            }
        };

        self.after_save(transport, scene_version);
        Ok(outcome)
    }

    /// Save a scene.
    ///
    /// Returns the elements to adopt, or `None` when nothing was saved
    /// (skipped or failed; failures are logged).
    pub async fn save(
        &self,
        session: &Session,
        elements: &[Element],
        ambient: &AmbientState,
    ) -> Option<Vec<Element>> {
        match self.try_save(session, elements, ambient).await {
            Ok(SaveOutcome::Skipped(reason)) => {
                debug!(?reason, "skipped scene save");
                None
            }
            Ok(outcome) => outcome.into_elements(),
            Err(e) => {
                error!(
                    room_id = ?session.room_id,
                    error = %e,
                    kind = ?e.kind(),
                    "failed to save scene"
                );
                None
            }
        }
    }

    /// Load a room's scene.
    ///
    /// `Ok(None)` means the room has no record yet. When a session with a
    /// live transport is given, its cache entry is set to the loaded scene.
    pub async fn try_load(
        &self,
        room_id: &RoomId,
        room_key: &RoomKey,
        session: Option<&Session>,
    ) -> Result<Option<Vec<Element>>> {
        let Some(record) = self.provider.fetch_record(room_id).await? else {
            debug!(room_id = %room_id, "no stored scene");
            return Ok(None);
        };

        let elements = self.decode_record(room_key, &record)?;

        if let Some(transport) = session.and_then(Session::live_transport) {
            let version = self.cache.set(transport, &elements);
            debug!(room_id = %room_id, %version, "cached loaded scene version");
        }

        Ok(Some(elements))
    }

    /// Load a room's scene, mapping absence and every failure to `None`.
    pub async fn load(
        &self,
        room_id: &RoomId,
        room_key: &RoomKey,
        session: Option<&Session>,
    ) -> Option<Vec<Element>> {
        match self.try_load(room_id, room_key, session).await {
            Ok(elements) => elements,
            Err(e) => {
                error!(room_id = %room_id, error = %e, kind = ?e.kind(), "failed to load scene");
                None
            }
        }
    }

    /// Decrypt, restore and filter a stored record.
    fn decode_record(&self, room_key: &RoomKey, record: &StoredRecord) -> Result<Vec<Element>> {
        let raw = decrypt_elements(self.cipher.as_ref(), room_key, &record.iv, &record.ciphertext)?;
        Ok(syncable_elements(
            restore_elements(raw),
            now_millis(),
            self.config.deleted_element_timeout_ms,
        ))
    }

    fn after_save(&self, transport: &Arc<TransportHandle>, version: SceneVersion) {
        if self.config.record_version_on_save {
            self.cache.record(transport, version);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FailureKind, SyncError};
    use scenesync_store::MemoryProvider;

    fn engine() -> SyncEngine<MemoryProvider> {
        SyncEngine::new(Arc::new(MemoryProvider::new()), SyncConfig::default())
    }

    fn el(id: &str, version: u64, index: &str) -> Element {
        Element::new(id, "rectangle")
            .with_version(version)
            .with_index(index)
            .with_prop("width", 10)
            .with_prop("height", 10)
    }

    fn ids(elements: &[Element]) -> Vec<&str> {
        elements.iter().map(|e| e.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_skip_reasons() {
        let engine = engine();
        let scene = vec![el("a", 1, "a0")];
        let ambient = AmbientState::new();

        let outcome = engine
            .try_save(&Session::detached(), &scene, &ambient)
            .await
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Skipped(SkipReason::NoRoom));

        let no_key = Session {
            room_key: None,
            ..Session::joined("r", RoomKey::generate())
        };
        let outcome = engine.try_save(&no_key, &scene, &ambient).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Skipped(SkipReason::NoKey));

        let session = Session::joined("r", RoomKey::generate()).without_transport();
        let outcome = engine.try_save(&session, &scene, &ambient).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Skipped(SkipReason::NoLiveTransport));

        let session = Session::joined("r", RoomKey::generate());
        if let Some(t) = &session.transport {
            t.disconnect();
        }
        assert_eq!(engine.save(&session, &scene, &ambient).await, None);

        assert_eq!(engine.provider().record_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_room_id_is_skipped() {
        let engine = engine();
        let session = Session::joined("", RoomKey::generate());
        let scene = vec![el("a", 1, "a0")];

        assert!(!engine.is_dirty(&session, &scene));
        let outcome = engine
            .try_save(&session, &scene, &AmbientState::new())
            .await
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Skipped(SkipReason::NoRoom));
        assert_eq!(engine.provider().record_count(), 0);
    }

    #[tokio::test]
    async fn test_create_then_skip_unchanged() {
        let engine = engine();
        let session = Session::joined("room", RoomKey::generate());
        let scene = vec![el("a", 1, "a0"), el("b", 1, "a1")];

        let saved = engine.save(&session, &scene, &AmbientState::new()).await;
        assert_eq!(saved, Some(scene.clone()));
        assert_eq!(engine.provider().record_count(), 1);
        assert!(!engine.is_dirty(&session, &scene));

        let outcome = engine
            .try_save(&session, &scene, &AmbientState::new())
            .await
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Skipped(SkipReason::Clean));
        assert!(!outcome.is_saved());
    }

    struct RemoteWins;

    impl Reconciler for RemoteWins {
        fn reconcile(
            &self,
            _local: &[Element],
            remote: Vec<Element>,
            _ambient: &AmbientState,
        ) -> Vec<Element> {
            remote
        }
    }

    #[tokio::test]
    async fn test_custom_reconciler_decides_merge() {
        let engine = engine().with_reconciler(Arc::new(RemoteWins));
        let key = RoomKey::generate();
        let stored = vec![el("a", 1, "a0")];
        engine
            .save(&Session::joined("room", key.clone()), &stored, &AmbientState::new())
            .await
            .unwrap();

        let outcome = engine
            .try_save(
                &Session::joined("room", key),
                &[el("a", 5, "a0"), el("b", 1, "a1")],
                &AmbientState::new(),
            )
            .await
            .unwrap();
        assert!(outcome.is_saved());
        assert_eq!(outcome.into_elements(), Some(stored));
    }

    #[tokio::test]
    async fn test_scene_version_hint_is_stored() {
        let engine = engine();
        let session = Session::joined("room", RoomKey::generate());
        let scene = vec![el("a", 4, "a0")];

        engine.save(&session, &scene, &AmbientState::new()).await;

        let data = engine.provider().record_data(&RoomId::new("room")).unwrap();
        assert_eq!(data.scene_version, SceneVersion::of(&scene));
        assert_eq!(data.iv.len(), 12);
    }

    #[tokio::test]
    async fn test_conflict_keeps_local_additions() {
        let engine = engine();
        let key = RoomKey::generate();

        let remote_session = Session::joined("room", key.clone());
        let remote_scene = vec![el("A", 2, "a0"), el("B", 1, "a1")];
        engine
            .save(&remote_session, &remote_scene, &AmbientState::new())
            .await
            .unwrap();

        let local_session = Session::joined("room", key.clone());
        let local_scene = vec![el("A", 1, "a0"), el("B", 1, "a1"), el("C", 1, "a2")];
        let outcome = engine
            .try_save(&local_session, &local_scene, &AmbientState::new())
            .await
            .unwrap();

        let SaveOutcome::Updated { merged } = outcome else {
            panic!("expected update, got {outcome:?}");
        };
        assert_eq!(ids(&merged), vec!["A", "B", "C"]);
        assert_eq!(merged[0].version, 2);

        // the stored record holds the local scene
        let loaded = engine.load(&RoomId::new("room"), &key, None).await.unwrap();
        assert_eq!(loaded, local_scene);
    }

    #[tokio::test]
    async fn test_load_roundtrip_sets_cache() {
        let engine = engine();
        let key = RoomKey::generate();
        let writer = Session::joined("room", key.clone());
        let scene = vec![el("a", 1, "a0").with_prop("label", "hello")];

        engine.save(&writer, &scene, &AmbientState::new()).await;

        let reader = Session::joined("room", key.clone());
        assert!(engine.is_dirty(&reader, &scene));

        let loaded = engine
            .try_load(&RoomId::new("room"), &key, Some(&reader))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, scene);
        assert!(!engine.is_dirty(&reader, &loaded));
    }

    #[tokio::test]
    async fn test_load_missing_room() {
        let engine = engine();
        let key = RoomKey::generate();

        assert!(engine
            .try_load(&RoomId::new("nope"), &key, None)
            .await
            .unwrap()
            .is_none());
        assert_eq!(engine.load(&RoomId::new("nope"), &key, None).await, None);
    }

    #[tokio::test]
    async fn test_wrong_key_load_fails() {
        let engine = engine();
        let session = Session::joined("room", RoomKey::generate());
        engine
            .save(&session, &[el("a", 1, "a0")], &AmbientState::new())
            .await;

        let wrong = RoomKey::generate();
        let err = engine
            .try_load(&RoomId::new("room"), &wrong, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Crypto(_)));
        assert_eq!(err.kind(), FailureKind::Corrupt);

        assert_eq!(engine.load(&RoomId::new("room"), &wrong, None).await, None);
    }

    #[tokio::test]
    async fn test_save_with_wrong_key_against_existing_record_fails() {
        let engine = engine();
        let first = Session::joined("room", RoomKey::generate());
        engine.save(&first, &[el("a", 1, "a0")], &AmbientState::new()).await;

        let second = Session::joined("room", RoomKey::generate());
        let result = engine
            .try_save(&second, &[el("b", 1, "a0")], &AmbientState::new())
            .await;
        assert!(matches!(result, Err(SyncError::Crypto(_))));

        // a failed save leaves the session dirty
        assert!(engine.is_dirty(&second, &[el("b", 1, "a0")]));
    }

    #[tokio::test]
    async fn test_cache_only_updated_on_load_when_disabled() {
        let config = SyncConfig {
            record_version_on_save: false,
            ..SyncConfig::default()
        };
        let engine = SyncEngine::new(Arc::new(MemoryProvider::new()), config);
        let session = Session::joined("room", RoomKey::generate());
        let scene = vec![el("a", 1, "a0")];

        engine.save(&session, &scene, &AmbientState::new()).await;
        assert!(engine.is_dirty(&session, &scene));

        let outcome = engine
            .try_save(&session, &scene, &AmbientState::new())
            .await
            .unwrap();
        assert!(matches!(outcome, SaveOutcome::Updated { .. }));
    }

    #[tokio::test]
    async fn test_stale_deleted_elements_are_not_loaded() {
        let engine = engine();
        let key = RoomKey::generate();
        let session = Session::joined("room", key.clone());
        let now = now_millis();
        let scene = vec![
            el("live", 1, "a0"),
            el("fresh-delete", 2, "a1").deleted().with_updated(now),
            el("old-delete", 2, "a2").deleted().with_updated(0),
        ];

        engine.save(&session, &scene, &AmbientState::new()).await;

        let loaded = engine.load(&RoomId::new("room"), &key, None).await.unwrap();
        assert_eq!(ids(&loaded), vec!["live", "fresh-delete"]);
    }
}
