use crate::model::peer::PeerId;
use serde::{Deserialize, Serialize};

/// Signaling envelopes exchanged over the relay WebSocket.
///
/// JSON on the wire, tagged by `type`, with camelCase field names. `offer`,
/// `answer` and `ice` carry `targetPeer` when sent client-to-relay and
/// `fromPeer` once the relay has stamped the sender's id while routing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalMessage {
    Join {
        code: String,
        #[serde(rename = "peerId", default, skip_serializing_if = "Option::is_none")]
        peer_id: Option<PeerId>,
    },
    Joined {
        code: String,
        #[serde(rename = "myId")]
        my_id: PeerId,
        peers: Vec<PeerId>,
        #[serde(rename = "peerCount")]
        peer_count: usize,
    },
    PeerJoined {
        #[serde(rename = "peerId")]
        peer_id: PeerId,
    },
    Offer {
        #[serde(rename = "targetPeer", default, skip_serializing_if = "Option::is_none")]
        target_peer: Option<PeerId>,
        #[serde(rename = "fromPeer", default, skip_serializing_if = "Option::is_none")]
        from_peer: Option<PeerId>,
        sdp: String,
    },
    Answer {
        #[serde(rename = "targetPeer", default, skip_serializing_if = "Option::is_none")]
        target_peer: Option<PeerId>,
        #[serde(rename = "fromPeer", default, skip_serializing_if = "Option::is_none")]
        from_peer: Option<PeerId>,
        sdp: String,
    },
    /// A single trickled ICE candidate; `candidate` is the JSON-serialized
    /// candidate-init object, treated as opaque by the relay.
    Ice {
        #[serde(rename = "targetPeer", default, skip_serializing_if = "Option::is_none")]
        target_peer: Option<PeerId>,
        #[serde(rename = "fromPeer", default, skip_serializing_if = "Option::is_none")]
        from_peer: Option<PeerId>,
        candidate: String,
    },
    PeerLeft {
        #[serde(rename = "peerId")]
        peer_id: PeerId,
    },
}

impl SignalMessage {
    pub fn msg_type(&self) -> &'static str {
        match self {
            SignalMessage::Join { .. } => "join",
            SignalMessage::Joined { .. } => "joined",
            SignalMessage::PeerJoined { .. } => "peer_joined",
            SignalMessage::Offer { .. } => "offer",
            SignalMessage::Answer { .. } => "answer",
            SignalMessage::Ice { .. } => "ice",
            SignalMessage::PeerLeft { .. } => "peer_left",
        }
    }

    /// Routing target, present only on the relayable payload types.
    pub fn target_peer(&self) -> Option<&PeerId> {
        match self {
            SignalMessage::Offer { target_peer, .. }
            | SignalMessage::Answer { target_peer, .. }
            | SignalMessage::Ice { target_peer, .. } => target_peer.as_ref(),
            _ => None,
        }
    }

    /// Return the same payload with `fromPeer` stamped and `targetPeer`
    /// cleared, as the relay does before forwarding.
    pub fn stamped_from(self, sender: &PeerId) -> Self {
        match self {
            SignalMessage::Offer { sdp, .. } => SignalMessage::Offer {
                target_peer: None,
                from_peer: Some(sender.clone()),
                sdp,
            },
            SignalMessage::Answer { sdp, .. } => SignalMessage::Answer {
                target_peer: None,
                from_peer: Some(sender.clone()),
                sdp,
            },
            SignalMessage::Ice { candidate, .. } => SignalMessage::Ice {
                target_peer: None,
                from_peer: Some(sender.clone()),
                candidate,
            },
            other => other,
        }
    }
}
