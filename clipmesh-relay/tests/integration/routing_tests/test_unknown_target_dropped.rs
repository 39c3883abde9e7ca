use crate::utils::{start_relay, TestPeer};
use clipmesh_core::{PeerId, SignalMessage};
use std::time::Duration;

#[tokio::test]
async fn routing_miss_is_silent_and_nonfatal() {
    let (addr, _service) = start_relay().await;

    let (mut alice, _, _) = TestPeer::join(addr, "482913", "peer-1-aaa").await;

    // Target never joined: no error comes back, nothing is delivered.
    alice
        .send(&SignalMessage::Offer {
            target_peer: Some(PeerId::from("peer-9-zzz")),
            from_peer: None,
            sdp: "v=0".to_string(),
        })
        .await;
    alice.expect_silence(Duration::from_millis(300)).await;

    // The sender's connection is still routable afterwards.
    let (mut bob, _, _) = TestPeer::join(addr, "482913", "peer-2-bbb").await;
    alice.recv().await; // peer_joined for bob

    bob.send(&SignalMessage::Offer {
        target_peer: Some(PeerId::from("peer-1-aaa")),
        from_peer: None,
        sdp: "v=0 still-alive".to_string(),
    })
    .await;
    match alice.recv().await {
        SignalMessage::Offer { sdp, .. } => assert_eq!(sdp, "v=0 still-alive"),
        other => panic!("expected offer, got {:?}", other),
    }
}
