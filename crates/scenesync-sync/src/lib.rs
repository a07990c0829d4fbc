//! # SceneSync Sync
//!
//! Persists encrypted scenes and attachments for collaboration rooms.
//!
//! ## Overview
//!
//! [`SyncEngine`] decides whether a scene needs saving, writes it through a
//! [`StorageProvider`](scenesync_store::StorageProvider), and reconciles
//! against whatever another collaborator stored in the meantime.
//! [`FileSync`] moves attachments in concurrent, failure-isolated batches.
//!
//! ## Key Properties
//!
//! - **Idempotent**: saving an unchanged scene performs no I/O
//! - **Lossless on conflict**: concurrent edits are merged, not overwritten
//! - **Key-blind storage**: room keys never leave the process
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scenesync_core::Element;
//! use scenesync_crypto::RoomKey;
//! use scenesync_store::MemoryProvider;
//! use scenesync_sync::{AmbientState, Session, SyncConfig, SyncEngine};
//!
//! async fn example() {
//!     let engine = SyncEngine::new(Arc::new(MemoryProvider::new()), SyncConfig::default());
//!     let session = Session::joined("room-1", RoomKey::generate());
//!
//!     let scene = vec![Element::new("a", "rectangle")];
//!     let saved = engine.save(&session, &scene, &AmbientState::new()).await;
//!     assert!(saved.is_some());
//! }
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod files;
pub mod reconcile;
pub mod session;

pub use cache::VersionCache;
pub use config::{FileSyncConfig, SyncConfig};
pub use engine::{SaveOutcome, SkipReason, SyncEngine};
pub use error::{FailureKind, Result, SyncError};
pub use files::{FileLoadReport, FileSaveReport, FileSync, FileUpload};
pub use reconcile::{AmbientState, Reconciler, VersionReconciler};
pub use session::{Session, TransportHandle, TransportId};
