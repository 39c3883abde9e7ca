use crate::sync::DEFAULT_POLL_INTERVAL;
use crate::transport::TransportConfig;
use clipmesh_core::{PeerId, RoomCode};
use std::time::Duration;

/// Everything a node needs to join a room and start syncing.
#[derive(Clone)]
pub struct NodeConfig {
    /// Relay base URL, e.g. `http://192.168.1.10:8080`. The `/ws` path and
    /// scheme rewrite are handled when connecting.
    pub server_url: String,
    pub room: RoomCode,
    /// Identity to register under. `None` lets the relay assign one.
    pub peer_id: Option<PeerId>,
    pub transport: TransportConfig,
    pub poll_interval: Duration,
}

impl NodeConfig {
    pub fn new(server_url: impl Into<String>, room: RoomCode) -> Self {
        Self {
            server_url: server_url.into(),
            room,
            peer_id: None,
            transport: TransportConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
