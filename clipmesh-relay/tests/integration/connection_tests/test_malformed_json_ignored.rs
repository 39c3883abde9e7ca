use crate::utils::{start_relay, TestPeer};
use clipmesh_core::{PeerId, SignalMessage};

#[tokio::test]
async fn malformed_envelopes_leave_connection_usable() {
    let (addr, _service) = start_relay().await;

    let mut peer = TestPeer::connect(addr).await;
    peer.send_raw("this is not json").await;
    peer.send_raw(r#"{"type":"teleport","code":"482913"}"#).await;
    peer.send_raw(r#"{"type":"join"}"#).await;

    // The connection must survive all three and still accept a join.
    peer.send(&SignalMessage::Join {
        code: "482913".to_string(),
        peer_id: Some(PeerId::from("peer-1-aaa")),
    })
    .await;

    match peer.recv().await {
        SignalMessage::Joined { peer_count, .. } => assert_eq!(peer_count, 1),
        other => panic!("expected joined, got {:?}", other),
    }
}
