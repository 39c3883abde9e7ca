use crate::utils::{start_relay, TestPeer};
use clipmesh_core::{PeerId, SignalMessage};

#[tokio::test]
async fn offer_reaches_target_with_sender_stamped() {
    let (addr, _service) = start_relay().await;

    let (mut alice, _, _) = TestPeer::join(addr, "482913", "peer-1-aaa").await;
    let (mut bob, _, _) = TestPeer::join(addr, "482913", "peer-2-bbb").await;
    alice.recv().await; // peer_joined for bob

    alice
        .send(&SignalMessage::Offer {
            target_peer: Some(PeerId::from("peer-2-bbb")),
            from_peer: None,
            sdp: "v=0 fake-offer".to_string(),
        })
        .await;

    match bob.recv().await {
        SignalMessage::Offer {
            target_peer,
            from_peer,
            sdp,
        } => {
            assert!(target_peer.is_none());
            assert_eq!(from_peer, Some(PeerId::from("peer-1-aaa")));
            assert_eq!(sdp, "v=0 fake-offer");
        }
        other => panic!("expected offer, got {:?}", other),
    }
}
