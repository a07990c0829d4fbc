//! End-to-end attachment save/load behaviour.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;
use tokio::sync::Notify;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scenesync::core::{FileId, RoomId, MIME_BINARY};
use scenesync::crypto::FileMetadata;
use scenesync::store::{
    FileBlob, HttpFetcher, HttpFetcherConfig, MemoryProvider, RecordData, RecordId,
    StorageProvider, StoredRecord,
};
use scenesync::{FileUpload, SceneSync, SceneSyncConfig, SyncError};
use scenesync_testkit::{Op, TestRoom};

use common::{faulty_sync, init_tracing};

const PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

#[tokio::test]
async fn one_failing_upload_does_not_block_the_rest() {
    init_tracing();
    let (provider, sync) = faulty_sync(SceneSyncConfig::default());
    let room = TestRoom::new();
    provider.fail_file_save("f3");

    let uploads: Vec<FileUpload> = (1..=5)
        .map(|i| room.upload(&format!("f{i}"), PNG, "image/png"))
        .collect();
    let report = sync.save_files(&room.files_prefix(), uploads).await;

    assert_eq!(report.saved_files.len(), 4);
    assert_eq!(report.errored_ids(), vec![&FileId::new("f3")]);
    assert!(!report.saved_files.contains(&FileId::new("f3")));
    assert_eq!(provider.calls(Op::SaveFile), 5);
    assert_eq!(provider.inner().file_count(), 4);
}

#[tokio::test]
async fn single_failing_upload_is_reported() {
    let (provider, sync) = faulty_sync(SceneSyncConfig::default());
    let room = TestRoom::new();
    provider.fail_file_save("only");

    let report = sync
        .save_files(&room.files_prefix(), vec![room.upload("only", PNG, "image/png")])
        .await;

    assert!(report.saved_files.is_empty());
    assert_eq!(report.errored_ids(), vec![&FileId::new("only")]);
    assert_eq!(provider.inner().file_count(), 0);
}

#[tokio::test]
async fn empty_batches_do_nothing() {
    let (provider, sync) = faulty_sync(SceneSyncConfig::default());
    let room = TestRoom::new();

    let saved = sync.save_files(&room.files_prefix(), Vec::new()).await;
    assert!(saved.saved_files.is_empty());
    assert!(saved.errored_files.is_empty());

    let loaded = sync.load_files(&room.files_prefix(), &room.key, &[]).await;
    assert!(loaded.loaded_files.is_empty());
    assert!(loaded.errored_files.is_empty());
    assert_eq!(provider.total_calls(), 0);
}

#[tokio::test]
async fn uploads_use_the_configured_mime_type() {
    let config = SceneSyncConfig::from_json_str(
        r#"{ "files": { "upload_mime_type": "application/x-encrypted" } }"#,
    )
    .unwrap();
    let (provider, sync) = faulty_sync(config);
    let room = TestRoom::new();

    sync.save_files(&room.files_prefix(), vec![room.upload("f", PNG, "image/png")])
        .await;

    let blob = provider
        .inner()
        .file(&room.files_prefix(), &FileId::new("f"))
        .unwrap();
    assert_eq!(blob.mime_type, "application/x-encrypted");
}

#[tokio::test]
async fn duplicate_ids_are_fetched_once() {
    let (provider, sync) = faulty_sync(SceneSyncConfig::default());
    let room = TestRoom::new();
    sync.save_files(
        &room.files_prefix(),
        vec![
            room.upload("a", PNG, "image/png"),
            room.upload("b", PNG, "image/png"),
        ],
    )
    .await;

    provider.reset_calls();
    let ids: Vec<FileId> = ["a", "b", "a", "a", "b"].iter().map(|s| FileId::new(*s)).collect();
    let report = sync.load_files(&room.files_prefix(), &room.key, &ids).await;

    assert_eq!(report.loaded_files.len(), 2);
    assert_eq!(provider.calls(Op::GetFileUrl), 2);
    assert_eq!(provider.calls(Op::Fetch), 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_each_unique_id_is_fetched_once(
        ids in scenesync_testkit::generators::file_ids_with_duplicates(6),
    ) {
        let mut seen = HashSet::new();
        let unique: Vec<FileId> = ids.iter().filter(|id| seen.insert(*id)).cloned().collect();

        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let (provider, sync) = faulty_sync(SceneSyncConfig::default());
            let room = TestRoom::new();
            let uploads = unique
                .iter()
                .map(|id| room.upload(id.as_str(), PNG, "image/png"))
                .collect();
            sync.save_files(&room.files_prefix(), uploads).await;

            provider.reset_calls();
            let report = sync.load_files(&room.files_prefix(), &room.key, &ids).await;

            let loaded: Vec<FileId> = report.loaded_files.iter().map(|f| f.id.clone()).collect();
            prop_assert_eq!(loaded, unique.clone());
            prop_assert_eq!(provider.calls(Op::GetFileUrl), unique.len());
            prop_assert_eq!(provider.calls(Op::Fetch), unique.len());
            Ok(())
        })?;
    }
}

#[tokio::test]
async fn loaded_files_carry_metadata() {
    let (_, sync) = faulty_sync(SceneSyncConfig::default());
    let room = TestRoom::new();
    sync.save_files(&room.files_prefix(), vec![room.upload("img", PNG, "image/png")])
        .await;

    let report = sync
        .load_files(&room.files_prefix(), &room.key, &[FileId::new("img")])
        .await;

    let file = &report.loaded_files[0];
    assert_eq!(file.id, FileId::new("img"));
    assert_eq!(file.mime_type, "image/png");
    assert_eq!(file.data_url.as_str(), PNG);
    assert_eq!(file.created, 1_700_000_000_000);
}

#[tokio::test]
async fn per_file_load_failures_are_isolated() {
    init_tracing();
    let (provider, sync) = faulty_sync(SceneSyncConfig::default());
    let room = TestRoom::new();
    sync.save_files(
        &room.files_prefix(),
        vec![
            room.upload("ok", PNG, "image/png"),
            room.upload("flaky", PNG, "image/png"),
        ],
    )
    .await;
    provider.fail_file_url("flaky");

    let ids = [FileId::new("ok"), FileId::new("flaky"), FileId::new("absent")];
    let report = sync.load_files(&room.files_prefix(), &room.key, &ids).await;

    assert_eq!(report.loaded_files.len(), 1);
    assert!(matches!(
        report.errored_files.get(&FileId::new("flaky")),
        Some(SyncError::Store(_))
    ));
    assert!(matches!(
        report.errored_files.get(&FileId::new("absent")),
        Some(SyncError::FileMissing(_))
    ));
}

#[tokio::test]
async fn files_are_scoped_by_prefix() {
    let (_, sync) = faulty_sync(SceneSyncConfig::default());
    let room = TestRoom::new();
    sync.save_files(&room.files_prefix(), vec![room.upload("f", PNG, "image/png")])
        .await;

    let report = sync
        .load_files("files/rooms/elsewhere", &room.key, &[FileId::new("f")])
        .await;
    assert!(report.loaded_files.is_empty());
    assert_eq!(report.errored_ids().len(), 1);
}

#[tokio::test]
async fn payload_encoding_roundtrips_without_metadata() {
    let (_, sync) = faulty_sync(SceneSyncConfig::default());
    let room = TestRoom::new();
    let payload = sync
        .encode_file(PNG.as_bytes(), &FileMetadata::default(), &room.key)
        .unwrap();
    sync.save_files(&room.files_prefix(), vec![FileUpload::new("bare", payload)])
        .await;

    let report = sync
        .load_files(&room.files_prefix(), &room.key, &[FileId::new("bare")])
        .await;
    assert_eq!(report.loaded_files[0].mime_type, MIME_BINARY);
}

/// Stores like memory, but hands out URLs on an HTTP server.
struct HostedProvider {
    inner: MemoryProvider,
    base_url: String,
}

#[async_trait]
impl StorageProvider for HostedProvider {
    async fn fetch_record(&self, room_id: &RoomId) -> scenesync::store::Result<Option<StoredRecord>> {
        self.inner.fetch_record(room_id).await
    }

    async fn create_record(&self, data: RecordData) -> scenesync::store::Result<()> {
        self.inner.create_record(data).await
    }

    async fn update_record(
        &self,
        record_id: &RecordId,
        data: RecordData,
    ) -> scenesync::store::Result<()> {
        self.inner.update_record(record_id, data).await
    }

    async fn save_file(
        &self,
        prefix: &str,
        file_id: &FileId,
        blob: FileBlob,
    ) -> scenesync::store::Result<()> {
        self.inner.save_file(prefix, file_id, blob).await
    }

    async fn get_file_url(
        &self,
        prefix: &str,
        file_id: &FileId,
    ) -> scenesync::store::Result<Option<String>> {
        Ok(self
            .inner
            .get_file_url(prefix, file_id)
            .await?
            .map(|_| format!("{}/{}/{}", self.base_url, prefix, file_id)))
    }
}

#[tokio::test]
async fn http_fetcher_downloads_hosted_files() {
    let server = MockServer::start().await;
    let room = TestRoom::new();
    let prefix = room.files_prefix();

    let provider = Arc::new(HostedProvider {
        inner: MemoryProvider::new(),
        base_url: server.uri(),
    });
    let fetcher = Arc::new(HttpFetcher::new(&HttpFetcherConfig::default()).unwrap());
    let sync = SceneSync::with_fetcher(provider, fetcher, SceneSyncConfig::default());

    let upload = room.upload("hosted", PNG, "image/png");
    Mock::given(method("GET"))
        .and(path(format!("/{}/hosted", prefix)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(upload.data.to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{}/expired", prefix)))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    sync.save_files(
        &prefix,
        vec![upload, FileUpload::new("expired", bytes::Bytes::from_static(b"x"))],
    )
    .await;

    let report = sync
        .load_files(
            &prefix,
            &room.key,
            &[FileId::new("hosted"), FileId::new("expired")],
        )
        .await;

    assert_eq!(report.loaded_files.len(), 1);
    assert_eq!(report.loaded_files[0].data_url.as_str(), PNG);
    assert!(matches!(
        report.errored_files.get(&FileId::new("expired")),
        Some(SyncError::FileStatus(410))
    ));
}

/// Holds `waits` in every file call until a call for `releases` arrives.
struct GatedProvider {
    inner: Arc<MemoryProvider>,
    gate: Notify,
}

impl GatedProvider {
    async fn pass(&self, file_id: &FileId) {
        match file_id.as_str() {
            "waits" => self.gate.notified().await,
            "releases" => self.gate.notify_one(),
            _ => {}
        }
    }
}

#[async_trait]
impl StorageProvider for GatedProvider {
    async fn fetch_record(&self, room_id: &RoomId) -> scenesync::store::Result<Option<StoredRecord>> {
        self.inner.fetch_record(room_id).await
    }

    async fn create_record(&self, data: RecordData) -> scenesync::store::Result<()> {
        self.inner.create_record(data).await
    }

    async fn update_record(
        &self,
        record_id: &RecordId,
        data: RecordData,
    ) -> scenesync::store::Result<()> {
        self.inner.update_record(record_id, data).await
    }

    async fn save_file(
        &self,
        prefix: &str,
        file_id: &FileId,
        blob: FileBlob,
    ) -> scenesync::store::Result<()> {
        self.pass(file_id).await;
        self.inner.save_file(prefix, file_id, blob).await
    }

    async fn get_file_url(
        &self,
        prefix: &str,
        file_id: &FileId,
    ) -> scenesync::store::Result<Option<String>> {
        self.pass(file_id).await;
        self.inner.get_file_url(prefix, file_id).await
    }
}

#[tokio::test]
async fn batch_items_run_concurrently() {
    let inner = Arc::new(MemoryProvider::new());
    let provider = Arc::new(GatedProvider {
        inner: Arc::clone(&inner),
        gate: Notify::new(),
    });
    let sync = SceneSync::with_fetcher(provider, inner.clone(), SceneSyncConfig::default());
    let room = TestRoom::new();
    let prefix = room.files_prefix();

    // `waits` comes first: a sequential batch never reaches `releases`.
    let uploads = vec![
        room.upload("waits", PNG, "image/png"),
        room.upload("releases", PNG, "image/png"),
    ];
    let saved = tokio::time::timeout(Duration::from_secs(5), sync.save_files(&prefix, uploads))
        .await
        .expect("uploads ran one after another");
    assert_eq!(saved.saved_files.len(), 2);

    let ids = [FileId::new("waits"), FileId::new("releases")];
    let loaded = tokio::time::timeout(
        Duration::from_secs(5),
        sync.load_files(&prefix, &room.key, &ids),
    )
    .await
    .expect("downloads ran one after another");
    assert_eq!(loaded.loaded_files.len(), 2);
    assert!(loaded.errored_files.is_empty());
}
