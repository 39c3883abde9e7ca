use axum::extract::ws::Message;
use clipmesh_core::PeerId;
use dashmap::DashMap;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::info;

/// Outbound handle for one relay connection. Sends are non-blocking; a send
/// into a closed channel means the peer's writer task is gone and the message
/// is dropped, which is the intended best-effort behavior.
pub type PeerSender = mpsc::UnboundedSender<Message>;

#[derive(Default)]
struct Room {
    peers: HashMap<PeerId, PeerSender>,
}

/// Result of registering a connection in a room, captured at the instant of
/// joining. `peer_count` is a snapshot, not a live value.
pub struct JoinOutcome {
    pub assigned: PeerId,
    pub existing: Vec<PeerId>,
    pub peer_count: usize,
    /// Senders for the peers that were already present, for the
    /// `peer_joined` fan-out.
    pub others: Vec<PeerSender>,
}

/// In-memory mapping of room code to registered peer connections.
///
/// All mutation of one room happens under that room's map entry, so
/// concurrent `join`/`route`/`leave` for the same code never interleave
/// partially. The registry knows nothing about negotiation progress; it is a
/// pure lookup structure keyed by `(code, peer id)`.
pub struct RoomRegistry {
    rooms: DashMap<String, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Register a connection under `(code, id)`, creating the room on first
    /// join. A missing id is assigned server-side. Re-using an id that is
    /// already present replaces the previous handle, keeping at most one
    /// handle per id.
    pub fn join(&self, code: &str, requested: Option<PeerId>, sender: PeerSender) -> JoinOutcome {
        let assigned = requested.unwrap_or_else(PeerId::generate);

        let mut room = self.rooms.entry(code.to_string()).or_default();
        room.peers.remove(&assigned);

        let mut existing = Vec::with_capacity(room.peers.len());
        let mut others = Vec::with_capacity(room.peers.len());
        for (id, tx) in room.peers.iter() {
            existing.push(id.clone());
            others.push(tx.clone());
        }

        room.peers.insert(assigned.clone(), sender);
        let peer_count = room.peers.len();

        JoinOutcome {
            assigned,
            existing,
            peer_count,
            others,
        }
    }

    /// Look up the connection handle for `target` in `code`. A miss is a
    /// silent drop at the call site; the relay offers no delivery feedback.
    pub fn route(&self, code: &str, target: &PeerId) -> Option<PeerSender> {
        self.rooms
            .get(code)
            .and_then(|room| room.peers.get(target).cloned())
    }

    /// Remove `peer` from its room, provided `sender` is still the handle
    /// registered under that id, and return the remaining members' handles
    /// for the `peer_left` broadcast. A stale connection whose id was
    /// re-registered by a newer join removes nothing. Deletes the room once
    /// its peer mapping is empty.
    pub fn leave(&self, code: &str, peer: &PeerId, sender: &PeerSender) -> Vec<PeerSender> {
        let remaining: Vec<PeerSender> = match self.rooms.get_mut(code) {
            Some(mut room) => {
                match room.peers.get(peer) {
                    Some(registered) if registered.same_channel(sender) => {}
                    _ => return Vec::new(),
                }
                room.peers.remove(peer);
                room.peers.values().cloned().collect()
            }
            None => return Vec::new(),
        };

        if remaining.is_empty() {
            self.rooms.remove_if(code, |_, room| room.peers.is_empty());
            info!("Room {} is empty, removing", code);
        }
        remaining
    }

    pub fn contains_room(&self, code: &str) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn room_size(&self, code: &str) -> usize {
        self.rooms.get(code).map(|r| r.peers.len()).unwrap_or(0)
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
