//! # SceneSync Core
//!
//! Pure primitives for SceneSync: elements, scene versions, restoration.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over element sequences.
//!
//! ## Key Types
//!
//! - [`Element`] - A versioned, orderable unit of drawing content
//! - [`SceneVersion`] - Deterministic summary of an ordered element sequence
//! - [`ElementId`], [`FileId`], [`RoomId`] - Identifier newtypes
//! - [`BinaryFileData`] - A loaded attachment
//!
//! ## Scene Versions
//!
//! Only the ordered `(id, version)` pairs contribute to a scene version. See
//! the [`version`] module.

pub mod element;
pub mod error;
pub mod restore;
pub mod serialize;
pub mod types;
pub mod version;

pub use element::Element;
pub use error::{CoreError, Result};
pub use restore::{
    is_invisibly_small, is_syncable, restore_elements, syncable_elements,
    DELETED_ELEMENT_TIMEOUT_MS,
};
pub use serialize::{scene_from_json, scene_to_json};
pub use types::{now_millis, BinaryFileData, DataUrl, ElementId, FileId, RoomId, MIME_BINARY};
pub use version::SceneVersion;
