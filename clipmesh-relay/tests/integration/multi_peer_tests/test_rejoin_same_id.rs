use crate::utils::{start_relay, TestPeer};
use clipmesh_core::{PeerId, SignalMessage};
use std::time::Duration;

#[tokio::test]
async fn stale_disconnect_keeps_replacement_registered() {
    let (addr, service) = start_relay().await;

    let (old, _, _) = TestPeer::join(addr, "482913", "peer-1-aaa").await;
    let (mut replacement, _, _) = TestPeer::join(addr, "482913", "peer-1-aaa").await;
    assert_eq!(service.registry().room_size("482913"), 1);

    // The replaced connection disconnects later; its leave must not evict
    // the id's current registration.
    old.close().await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(service.registry().room_size("482913"), 1);

    // The replacement still receives traffic routed to the id.
    let (mut bob, _, _) = TestPeer::join(addr, "482913", "peer-2-bbb").await;
    match replacement.recv().await {
        SignalMessage::PeerJoined { peer_id } => {
            assert_eq!(peer_id, PeerId::from("peer-2-bbb"));
        }
        other => panic!("expected peer_joined, got {:?}", other),
    }

    bob.send(&SignalMessage::Offer {
        target_peer: Some(PeerId::from("peer-1-aaa")),
        from_peer: None,
        sdp: "v=0 to-replacement".to_string(),
    })
    .await;
    match replacement.recv().await {
        SignalMessage::Offer { sdp, .. } => assert_eq!(sdp, "v=0 to-replacement"),
        other => panic!("expected offer, got {:?}", other),
    }
}
