//! # SceneSync
//!
//! The unified API for SceneSync - end-to-end encrypted persistence of
//! collaborative whiteboard scenes and their attachments.
//!
//! ## Overview
//!
//! SceneSync sits between a collaboration session and a storage backend:
//!
//! - **Scenes**: Encrypted with the room key, saved only when changed,
//!   reconciled against concurrent writers
//! - **Attachments**: Uploaded and downloaded in concurrent batches where
//!   one failing file never affects the others
//! - **Storage**: Any [`StorageProvider`](store::StorageProvider); SQLite and
//!   in-memory backends are included
//!
//! ## Key Concepts
//!
//! - **Room**: One shared document and its attachment namespace.
//! - **Scene version**: A hash of the ordered `(id, version)` pairs of a
//!   scene, used to skip redundant saves.
//! - **Reconciliation**: Merging the stored scene with the local one when
//!   someone else saved in between.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scenesync::{AmbientState, SceneSync, SceneSyncConfig, Session};
//! use scenesync::core::Element;
//! use scenesync::crypto::RoomKey;
//!
//! async fn example() {
//!     // Open storage
//!     let sync = SceneSync::open("scenes.db", SceneSyncConfig::default()).unwrap();
//!
//!     // Join a room
//!     let session = Session::joined("room-1", RoomKey::generate());
//!
//!     // Save the scene; unchanged scenes are skipped
//!     let scene = vec![Element::new("a", "rectangle")];
//!     let merged = sync.save(&session, &scene, &AmbientState::new()).await;
//!     assert!(merged.is_some());
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `scenesync::core` - Elements, ids, scene versions, restoration
//! - `scenesync::crypto` - Room keys, scene cipher, file codec
//! - `scenesync::store` - Storage abstraction, SQLite, HTTP fetcher
//! - `scenesync::sync` - Version cache, reconciler, engine, file sync

pub mod config;
pub mod error;
pub mod scene_sync;

// Re-export component crates
pub use scenesync_core as core;
pub use scenesync_crypto as crypto;
pub use scenesync_store as store;
pub use scenesync_sync as sync;

// Re-export main types for convenience
pub use config::SceneSyncConfig;
pub use error::{Result, SceneSyncError};
pub use scene_sync::SceneSync;

pub use scenesync_sync::{
    AmbientState, FailureKind, FileLoadReport, FileSaveReport, FileSyncConfig, FileUpload,
    SaveOutcome, Session, SkipReason, SyncConfig, SyncError, TransportHandle,
};
