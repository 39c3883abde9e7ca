use crate::utils::{start_relay, TestPeer};
use clipmesh_core::{PeerId, SignalMessage};
use std::time::Duration;

#[tokio::test]
async fn third_join_notifies_both_existing_peers_once() {
    let (addr, _service) = start_relay().await;

    let (mut alice, peers, count) = TestPeer::join(addr, "482913", "peer-1-aaa").await;
    assert!(peers.is_empty());
    assert_eq!(count, 1);

    let (mut bob, peers, count) = TestPeer::join(addr, "482913", "peer-2-bbb").await;
    assert_eq!(peers, vec![PeerId::from("peer-1-aaa")]);
    assert_eq!(count, 2);

    // Alice sees Bob arrive.
    assert_eq!(
        alice.recv().await,
        SignalMessage::PeerJoined {
            peer_id: PeerId::from("peer-2-bbb")
        }
    );

    let (_carol, mut peers, count) = TestPeer::join(addr, "482913", "peer-3-ccc").await;
    peers.sort();
    assert_eq!(
        peers,
        vec![PeerId::from("peer-1-aaa"), PeerId::from("peer-2-bbb")]
    );
    assert_eq!(count, 3);

    // Both existing peers get exactly one notification each.
    let expected = SignalMessage::PeerJoined {
        peer_id: PeerId::from("peer-3-ccc"),
    };
    assert_eq!(alice.recv().await, expected);
    assert_eq!(bob.recv().await, expected);
    alice.expect_silence(Duration::from_millis(300)).await;
    bob.expect_silence(Duration::from_millis(300)).await;
}
