use crate::utils::{start_relay, TestPeer};
use clipmesh_core::{PeerId, SignalMessage};

#[tokio::test]
async fn join_empty_room_returns_no_peers() {
    let (addr, _service) = start_relay().await;

    let mut peer = TestPeer::connect(addr).await;
    peer.send(&SignalMessage::Join {
        code: "482913".to_string(),
        peer_id: Some(PeerId::from("peer-1-aaa")),
    })
    .await;

    match peer.recv().await {
        SignalMessage::Joined {
            code,
            my_id,
            peers,
            peer_count,
        } => {
            assert_eq!(code, "482913");
            assert_eq!(my_id, PeerId::from("peer-1-aaa"));
            assert!(peers.is_empty());
            assert_eq!(peer_count, 1);
        }
        other => panic!("expected joined, got {:?}", other),
    }
}
