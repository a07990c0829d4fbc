//! # SceneSync Testkit
//!
//! Testing utilities for SceneSync.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Element and scene builders, and [`TestRoom`] for setting up rooms
//! - **Generators**: Proptest strategies for property-based testing
//! - **Faults**: [`FaultyProvider`], a provider wrapper with failure switches and call counters
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use scenesync_core::SceneVersion;
//! use scenesync_testkit::generators::scene;
//!
//! proptest! {
//!     #[test]
//!     fn scene_version_is_deterministic(s in scene(20)) {
//!         prop_assert_eq!(SceneVersion::of(&s), SceneVersion::of(&s.clone()));
//!     }
//! }
//! ```
//!
//! ## Fault Injection
//!
//! ```rust
//! use std::sync::Arc;
//! use scenesync_store::MemoryProvider;
//! use scenesync_testkit::{FaultyProvider, Op};
//!
//! let provider = FaultyProvider::new(Arc::new(MemoryProvider::new()));
//! provider.fail(Op::UpdateRecord);
//! provider.fail_file_save("broken-image");
//! assert_eq!(provider.total_calls(), 0);
//! ```

pub mod faults;
pub mod fixtures;
pub mod generators;

pub use faults::{FaultyProvider, Op};
pub use fixtures::{edited, element, multi_party_sessions, scene, TestRoom};
