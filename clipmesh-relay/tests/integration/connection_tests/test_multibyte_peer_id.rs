use crate::utils::{start_relay, TestPeer};
use std::time::Duration;

#[tokio::test]
async fn multibyte_peer_id_joins_and_cleans_up() {
    // An active subscriber forces the log-line formatting that renders
    // shortened ids; ids with multi-byte characters must survive it.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let (addr, service) = start_relay().await;

    let (peer, peers, count) = TestPeer::join(addr, "482913", "päär-€€€-abc").await;
    assert!(peers.is_empty());
    assert_eq!(count, 1);

    // The handler must reach its leave path on disconnect, emptying the room.
    peer.close().await;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while service.registry().contains_room("482913") {
        assert!(
            tokio::time::Instant::now() < deadline,
            "room was never removed"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
