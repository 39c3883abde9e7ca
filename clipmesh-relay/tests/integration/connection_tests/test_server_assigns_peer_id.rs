use crate::utils::{start_relay, TestPeer};
use clipmesh_core::SignalMessage;

#[tokio::test]
async fn join_without_id_gets_generated_one() {
    let (addr, _service) = start_relay().await;

    let mut peer = TestPeer::connect(addr).await;
    peer.send(&SignalMessage::Join {
        code: "111222".to_string(),
        peer_id: None,
    })
    .await;

    match peer.recv().await {
        SignalMessage::Joined { my_id, .. } => {
            assert!(my_id.as_str().starts_with("peer-"));
        }
        other => panic!("expected joined, got {:?}", other),
    }
}
