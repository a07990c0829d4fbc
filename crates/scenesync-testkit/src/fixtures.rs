//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use rand::RngCore;

use scenesync_core::{Element, RoomId};
use scenesync_crypto::{EnvelopeFileCodec, FileCodec, FileMetadata, RoomKey};
use scenesync_sync::{FileUpload, Session};

/// A visible rectangle at version 1.
pub fn element(id: &str, index: &str) -> Element {
    Element::new(id, "rectangle")
        .with_index(index)
        .with_prop("x", 0)
        .with_prop("y", 0)
        .with_prop("width", 100)
        .with_prop("height", 50)
}

/// A scene of `count` visible elements, ids `el-0..`, in index order.
pub fn scene(count: usize) -> Vec<Element> {
    (0..count)
        .map(|i| element(&format!("el-{i}"), &format!("a{i:04}")))
        .collect()
}

/// Bump an element's version, as an edit would.
pub fn edited(element: &Element) -> Element {
    element
        .clone()
        .with_version(element.version + 1)
        .with_nonce(element.version_nonce.wrapping_add(1))
}

/// A room id and its key.
pub struct TestRoom {
    pub room_id: RoomId,
    pub key: RoomKey,
}

impl TestRoom {
    /// A room with a random id and key.
    pub fn new() -> Self {
        let mut id = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut id);
        Self {
            room_id: RoomId::new(hex::encode(id)),
            key: RoomKey::generate(),
        }
    }

    /// A room with a deterministic key from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            room_id: RoomId::new(format!("room-{}", hex::encode(&seed[..4]))),
            key: RoomKey::from_bytes(seed),
        }
    }

    /// A fresh collaborator session in this room.
    pub fn session(&self) -> Session {
        Session::joined(self.room_id.clone(), self.key.clone())
    }

    /// Attachment prefix of this room.
    pub fn files_prefix(&self) -> String {
        format!("files/rooms/{}", self.room_id)
    }

    /// An encoded attachment upload holding `data_url`.
    pub fn upload(&self, id: &str, data_url: &str, mime_type: &str) -> FileUpload {
        let metadata = FileMetadata::new(mime_type, 1_700_000_000_000);
        let payload = EnvelopeFileCodec::new()
            .encode(data_url.as_bytes(), &metadata, &self.key)
            .expect("encode attachment");
        FileUpload::new(id, payload)
    }
}

impl Default for TestRoom {
    fn default() -> Self {
        Self::new()
    }
}

/// Create `count` sessions joined to the same room.
pub fn multi_party_sessions(room: &TestRoom, count: usize) -> Vec<Session> {
    (0..count).map(|_| room.session()).collect()
}
