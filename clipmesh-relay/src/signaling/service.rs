use crate::room::{PeerSender, RoomRegistry};
use axum::extract::ws::Message;
use clipmesh_core::{PeerId, SignalMessage};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Stateless message routing on top of the room registry. One instance is
/// shared by every WebSocket connection; all room state lives in the
/// registry.
#[derive(Clone)]
pub struct RelayService {
    registry: Arc<RoomRegistry>,
}

impl RelayService {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RoomRegistry::new()),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Register the connection, reply `joined` to it and notify everyone
    /// already in the room with `peer_joined`, best-effort and in no
    /// guaranteed order. Returns the assigned peer id.
    pub fn join(&self, code: &str, requested: Option<PeerId>, tx: &PeerSender) -> PeerId {
        let outcome = self.registry.join(code, requested, tx.clone());

        info!(
            "Peer {}... joined room {}. Total peers: {}",
            outcome.assigned.short(),
            code,
            outcome.peer_count
        );

        send(
            tx,
            &SignalMessage::Joined {
                code: code.to_string(),
                my_id: outcome.assigned.clone(),
                peers: outcome.existing,
                peer_count: outcome.peer_count,
            },
        );

        let notification = SignalMessage::PeerJoined {
            peer_id: outcome.assigned.clone(),
        };
        for other in &outcome.others {
            send(other, &notification);
        }

        outcome.assigned
    }

    /// Forward an `offer`/`answer`/`ice` envelope to its target within the
    /// sender's room, with `fromPeer` stamped. Unknown targets are dropped
    /// silently; the sender is never informed.
    pub fn route(&self, code: &str, sender_id: &PeerId, msg: SignalMessage) {
        let Some(target) = msg.target_peer().cloned() else {
            warn!(
                "{} from {}... has no targetPeer, dropping",
                msg.msg_type(),
                sender_id.short()
            );
            return;
        };

        match self.registry.route(code, &target) {
            Some(tx) => send(&tx, &msg.stamped_from(sender_id)),
            None => debug!(
                "Target {}... not in room {}, dropping {}",
                target.short(),
                code,
                msg.msg_type()
            ),
        }
    }

    /// Deregister the peer, provided `tx` still owns the registration, and
    /// broadcast `peer_left` to the remaining members.
    pub fn leave(&self, code: &str, peer: &PeerId, tx: &PeerSender) {
        let remaining = self.registry.leave(code, peer, tx);
        info!(
            "Peer {}... left room {}. Remaining peers: {}",
            peer.short(),
            code,
            remaining.len()
        );

        let notification = SignalMessage::PeerLeft {
            peer_id: peer.clone(),
        };
        for tx in &remaining {
            send(tx, &notification);
        }
    }
}

impl Default for RelayService {
    fn default() -> Self {
        Self::new()
    }
}

fn send(tx: &PeerSender, msg: &SignalMessage) {
    match serde_json::to_string(msg) {
        // A closed channel means the peer's writer task already exited;
        // at-most-once delivery, so just drop.
        Ok(json) => {
            let _ = tx.send(Message::Text(json.into()));
        }
        Err(e) => error!("Failed to serialize {} envelope: {}", msg.msg_type(), e),
    }
}
