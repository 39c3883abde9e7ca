use crate::utils::{start_relay, TestPeer};
use clipmesh_core::{PeerId, SignalMessage};

#[tokio::test]
async fn answer_and_ice_route_one_to_one() {
    let (addr, _service) = start_relay().await;

    let (mut alice, _, _) = TestPeer::join(addr, "482913", "peer-1-aaa").await;
    let (mut bob, _, _) = TestPeer::join(addr, "482913", "peer-2-bbb").await;
    alice.recv().await; // peer_joined for bob

    bob.send(&SignalMessage::Answer {
        target_peer: Some(PeerId::from("peer-1-aaa")),
        from_peer: None,
        sdp: "v=0 fake-answer".to_string(),
    })
    .await;

    match alice.recv().await {
        SignalMessage::Answer { from_peer, sdp, .. } => {
            assert_eq!(from_peer, Some(PeerId::from("peer-2-bbb")));
            assert_eq!(sdp, "v=0 fake-answer");
        }
        other => panic!("expected answer, got {:?}", other),
    }

    alice
        .send(&SignalMessage::Ice {
            target_peer: Some(PeerId::from("peer-2-bbb")),
            from_peer: None,
            candidate: r#"{"candidate":"candidate:1 1 udp 1 127.0.0.1 9 typ host"}"#.to_string(),
        })
        .await;

    match bob.recv().await {
        SignalMessage::Ice {
            from_peer,
            candidate,
            ..
        } => {
            assert_eq!(from_peer, Some(PeerId::from("peer-1-aaa")));
            assert!(candidate.contains("typ host"));
        }
        other => panic!("expected ice, got {:?}", other),
    }
}
