//! SQLite implementation of the StorageProvider trait.
//!
//! A self-hosted backend for single-node deployments and tests. It uses
//! rusqlite with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use rand::RngCore;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use scenesync_core::{now_millis, FileId, RoomId, SceneVersion};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{
    self, parse_file_url, BlobFetcher, FetchResponse, FileBlob, RecordData, RecordId,
    StorageProvider, StoredRecord,
};

/// URL scheme served by [`SqliteProvider`]'s fetcher.
pub const SQLITE_SCHEME: &str = "sqlite";

/// SQLite-based provider implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteProvider {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteProvider {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// URL under which a file is served by this provider's fetcher.
    pub fn file_url(prefix: &str, file_id: &FileId) -> String {
        traits::file_url(SQLITE_SCHEME, prefix, file_id)
    }

    /// The scene version hint stored with a room's record.
    pub async fn scene_version_hint(&self, room_id: &RoomId) -> Result<Option<SceneVersion>> {
        let room_id = room_id.clone();
        self.run(move |conn| {
            let hint: Option<i64> = conn
                .query_row(
                    "SELECT scene_version FROM scenes WHERE room_id = ?1",
                    params![room_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(hint.map(|v| SceneVersion(v as u64)))
        })
        .await
    }

    /// Run a blocking closure against the connection.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

/// Generate a random record id (16 bytes, hex).
fn new_record_id() -> RecordId {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    RecordId(hex::encode(bytes))
}

#[async_trait]
impl StorageProvider for SqliteProvider {
    async fn fetch_record(&self, room_id: &RoomId) -> Result<Option<StoredRecord>> {
        let room_id = room_id.clone();

        self.run(move |conn| {
            conn.query_row(
                "SELECT record_id, ciphertext, iv FROM scenes WHERE room_id = ?1",
                params![room_id.as_str()],
                |row| {
                    Ok(StoredRecord {
                        id: RecordId(row.get(0)?),
                        ciphertext: row.get(1)?,
                        iv: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn create_record(&self, data: RecordData) -> Result<()> {
        self.run(move |conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT record_id FROM scenes WHERE room_id = ?1",
                    params![data.room_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            if existing.is_some() {
                return Err(StoreError::Conflict(data.room_id.to_string()));
            }

            let record_id = new_record_id();
            let now = now_millis();
            conn.execute(
                "INSERT INTO scenes (
                    record_id, room_id, scene_version, ciphertext, iv, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    record_id.as_str(),
                    data.room_id.as_str(),
                    data.scene_version.0 as i64,
                    data.ciphertext,
                    data.iv,
                    now,
                ],
            )?;

            debug!(room_id = %data.room_id, record_id = %record_id, "created scene record");
            Ok(())
        })
        .await
    }

    async fn update_record(&self, record_id: &RecordId, data: RecordData) -> Result<()> {
        let record_id = record_id.clone();

        self.run(move |conn| {
            let changed = conn.execute(
                "UPDATE scenes
                 SET scene_version = ?2, ciphertext = ?3, iv = ?4, updated_at = ?5
                 WHERE record_id = ?1",
                params![
                    record_id.as_str(),
                    data.scene_version.0 as i64,
                    data.ciphertext,
                    data.iv,
                    now_millis(),
                ],
            )?;

            if changed == 0 {
                return Err(StoreError::NotFound(format!("record {}", record_id)));
            }
            Ok(())
        })
        .await
    }

    async fn save_file(&self, prefix: &str, file_id: &FileId, blob: FileBlob) -> Result<()> {
        let prefix = prefix.to_string();
        let file_id = file_id.clone();

        self.run(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO files (prefix, file_id, mime_type, data, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    prefix,
                    file_id.as_str(),
                    blob.mime_type,
                    blob.data.as_ref(),
                    now_millis(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_file_url(&self, prefix: &str, file_id: &FileId) -> Result<Option<String>> {
        let prefix = prefix.to_string();
        let file_id = file_id.clone();

        self.run(move |conn| {
            let exists: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM files WHERE prefix = ?1 AND file_id = ?2",
                    params![prefix, file_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(exists.map(|_| Self::file_url(&prefix, &file_id)))
        })
        .await
    }
}

#[async_trait]
impl BlobFetcher for SqliteProvider {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let (prefix, file_id) = parse_file_url(SQLITE_SCHEME, url)
            .ok_or_else(|| StoreError::InvalidUrl(url.to_string()))?;
        let prefix = prefix.to_string();

        self.run(move |conn| {
            let data: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT data FROM files WHERE prefix = ?1 AND file_id = ?2",
                    params![prefix, file_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(data
                .map(|d| FetchResponse::ok(Bytes::from(d)))
                .unwrap_or_else(FetchResponse::not_found))
        })
        .await
    }
}
