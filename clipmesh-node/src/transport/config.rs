/// WebRTC transport configuration.
#[derive(Clone)]
pub struct TransportConfig {
    /// STUN/TURN server URLs for candidate gathering. An empty list limits
    /// gathering to host candidates, which is enough for loopback tests.
    pub ice_servers: Vec<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec!["stun:stun.l.google.com:19302".to_owned()],
        }
    }
}
