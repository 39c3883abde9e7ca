use bytes::Bytes;
use clipmesh_core::PeerId;

/// Typed notifications emitted by the mesh. Events for one peer arrive in
/// the order they happened; no ordering is defined across peers.
#[derive(Debug, Clone)]
pub enum NodeEvent {
    /// `connected` counts peers with an open data channel; `total` counts
    /// every known remote id, connected or still negotiating.
    PeerCountChanged { connected: usize, total: usize },
    /// Raw bytes received on a peer's data channel.
    Message { from: PeerId, data: Bytes },
}
