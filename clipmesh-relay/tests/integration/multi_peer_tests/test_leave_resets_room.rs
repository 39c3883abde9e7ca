use crate::utils::{start_relay, TestPeer};
use clipmesh_core::{PeerId, SignalMessage};
use std::time::Duration;

#[tokio::test]
async fn last_leave_removes_room_and_rejoin_is_fresh() {
    let (addr, service) = start_relay().await;

    let (mut alice, _, _) = TestPeer::join(addr, "482913", "peer-1-aaa").await;
    let (bob, _, _) = TestPeer::join(addr, "482913", "peer-2-bbb").await;
    assert_eq!(
        alice.recv().await,
        SignalMessage::PeerJoined {
            peer_id: PeerId::from("peer-2-bbb")
        }
    );

    bob.close().await;
    assert_eq!(
        alice.recv().await,
        SignalMessage::PeerLeft {
            peer_id: PeerId::from("peer-2-bbb")
        }
    );

    alice.close().await;

    // Disconnect handling is asynchronous; wait for the registry to settle.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while service.registry().contains_room("482913") {
        assert!(
            tokio::time::Instant::now() < deadline,
            "room was never removed"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    // Same code now behaves as a brand-new room.
    let (_carol, peers, count) = TestPeer::join(addr, "482913", "peer-3-ccc").await;
    assert!(peers.is_empty());
    assert_eq!(count, 1);
}
