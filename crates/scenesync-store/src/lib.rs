//! # SceneSync Store
//!
//! Storage abstraction for SceneSync. Provides a trait-based interface for
//! encrypted scene records and attachment blobs, with SQLite and in-memory
//! implementations.
//!
//! ## Overview
//!
//! The sync layer only ever talks to a [`StorageProvider`]. The backend sees
//! room ids, opaque ciphertext, IVs and a scene version hint; it never sees
//! room keys or plaintext. Attachment downloads go through a separate
//! [`BlobFetcher`], because hosted backends hand out URLs rather than bytes.
//!
//! ## Key Types
//!
//! - [`StorageProvider`] - The async trait for record and file operations
//! - [`BlobFetcher`] - Downloads content behind a file URL
//! - [`SqliteProvider`] - SQLite-based persistent storage
//! - [`MemoryProvider`] - In-memory storage for tests
//! - [`HttpFetcher`] - reqwest-backed fetcher for hosted URLs
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scenesync_core::{RoomId, SceneVersion};
//! use scenesync_store::{RecordData, SqliteProvider, StorageProvider};
//!
//! async fn example() {
//!     let provider = SqliteProvider::open("scenes.db").unwrap();
//!
//!     provider
//!         .create_record(RecordData {
//!             room_id: RoomId::new("room-1"),
//!             scene_version: SceneVersion(0),
//!             ciphertext: vec![],
//!             iv: vec![0; 12],
//!         })
//!         .await
//!         .unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **One record per room**: creating a second record is a `Conflict`
//! - **Immutable files**: re-uploading a `(prefix, file_id)` keeps the first blob
//! - **Absence is not an error**: missing records and file URLs are `Ok(None)`

pub mod error;
pub mod http;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use http::{HttpFetcher, HttpFetcherConfig};
pub use memory::{MemoryProvider, MEMORY_SCHEME};
pub use sqlite::{SqliteProvider, SQLITE_SCHEME};
pub use traits::{
    file_url, parse_file_url, BlobFetcher, FetchResponse, FileBlob, RecordData, RecordId,
    StorageProvider, StoredRecord,
};
