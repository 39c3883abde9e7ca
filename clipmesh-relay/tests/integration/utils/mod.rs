mod test_peer;

pub use test_peer::TestPeer;

use clipmesh_relay::RelayService;
use std::net::SocketAddr;

/// Start a relay on an ephemeral loopback port. Returns the bound address
/// and the service handle for registry inspection.
pub async fn start_relay() -> (SocketAddr, RelayService) {
    let service = RelayService::new();
    let addr = clipmesh_relay::spawn("127.0.0.1:0".parse().unwrap(), service.clone())
        .await
        .expect("spawn relay");
    (addr, service)
}
