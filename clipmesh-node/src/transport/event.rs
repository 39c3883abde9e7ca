use bytes::Bytes;
use clipmesh_core::PeerId;

/// Events surfaced by a peer transport to the mesh event loop.
#[derive(Debug)]
pub enum TransportEvent {
    /// The data channel to this peer is open and writable; the pair is now
    /// connected.
    ChannelOpen(PeerId),
    /// Bytes received on the data channel.
    Message(PeerId, Bytes),
    /// A locally gathered ICE candidate (JSON-serialized candidate-init) to
    /// trickle to the peer via the relay.
    LocalCandidate(PeerId, String),
    /// The connection failed, disconnected or was closed. Terminal.
    Closed(PeerId),
}
