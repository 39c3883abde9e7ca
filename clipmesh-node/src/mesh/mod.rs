mod manager;
mod peer_state;

pub use manager::{MeshCommand, MeshManager};
pub use peer_state::{initiates, NegotiationPhase, PeerState};
