use crate::utils::{start_relay, TestPeer};
use clipmesh_core::{PeerId, SignalMessage};
use std::time::Duration;

#[tokio::test]
async fn offer_before_join_is_dropped() {
    let (addr, _service) = start_relay().await;

    let mut peer = TestPeer::connect(addr).await;
    peer.send(&SignalMessage::Offer {
        target_peer: Some(PeerId::from("peer-9-zzz")),
        from_peer: None,
        sdp: "v=0".to_string(),
    })
    .await;

    peer.expect_silence(Duration::from_millis(300)).await;

    peer.send(&SignalMessage::Join {
        code: "482913".to_string(),
        peer_id: Some(PeerId::from("peer-1-aaa")),
    })
    .await;
    match peer.recv().await {
        SignalMessage::Joined { .. } => {}
        other => panic!("expected joined, got {:?}", other),
    }
}
