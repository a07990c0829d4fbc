//! Collaboration session handles.
//!
//! A [`Session`] is owned by the caller. The engine only borrows it, and uses
//! the transport purely as a cache key and a liveness flag.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use scenesync_core::RoomId;
use scenesync_crypto::RoomKey;

static NEXT_TRANSPORT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a transport handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransportId(u64);

impl fmt::Display for TransportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport-{}", self.0)
    }
}

/// A live collaboration channel.
///
/// The network side of the channel lives elsewhere; this handle only tracks
/// identity and whether the channel is still connected.
#[derive(Debug)]
pub struct TransportHandle {
    id: TransportId,
    connected: AtomicBool,
}

impl TransportHandle {
    /// A new connected transport.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: TransportId(NEXT_TRANSPORT_ID.fetch_add(1, Ordering::Relaxed)),
            connected: AtomicBool::new(true),
        })
    }

    /// Identifier used as the version cache key.
    pub fn id(&self) -> TransportId {
        self.id
    }

    /// Whether the channel is still connected.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Mark the channel as disconnected.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
    }

    /// Mark the channel as connected again.
    pub fn reconnect(&self) {
        self.connected.store(true, Ordering::Release);
    }
}

/// One participant's view of a collaboration.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub room_id: Option<RoomId>,
    pub room_key: Option<RoomKey>,
    pub transport: Option<Arc<TransportHandle>>,
}

impl Session {
    /// A fully joined session with a fresh transport.
    pub fn joined(room_id: impl Into<RoomId>, room_key: RoomKey) -> Self {
        Self {
            room_id: Some(room_id.into()),
            room_key: Some(room_key),
            transport: Some(TransportHandle::new()),
        }
    }

    /// A session not attached to any room.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Replace the transport.
    pub fn with_transport(mut self, transport: Arc<TransportHandle>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Drop the transport.
    pub fn without_transport(mut self) -> Self {
        self.transport = None;
        self
    }

    /// The room id, unless missing or empty.
    pub fn room(&self) -> Option<&RoomId> {
        self.room_id.as_ref().filter(|id| !id.is_empty())
    }

    /// The transport, if present and connected.
    pub fn live_transport(&self) -> Option<&Arc<TransportHandle>> {
        self.transport.as_ref().filter(|t| t.is_connected())
    }
}
