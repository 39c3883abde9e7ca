use clipmesh_core::{PeerId, SignalMessage};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A bare WebSocket client speaking the signaling protocol, for driving the
/// relay from tests.
pub struct TestPeer {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestPeer {
    pub async fn connect(addr: SocketAddr) -> Self {
        let (ws, _) = connect_async(format!("ws://{}/ws", addr))
            .await
            .expect("connect to relay");
        Self { ws }
    }

    /// Connect and join, asserting the `joined` reply. Returns the peer and
    /// the reply's `(peers, peer_count)` snapshot.
    pub async fn join(addr: SocketAddr, code: &str, id: &str) -> (Self, Vec<PeerId>, usize) {
        let mut peer = Self::connect(addr).await;
        peer.send(&SignalMessage::Join {
            code: code.to_string(),
            peer_id: Some(PeerId::from(id)),
        })
        .await;
        match peer.recv().await {
            SignalMessage::Joined {
                my_id,
                peers,
                peer_count,
                ..
            } => {
                assert_eq!(my_id, PeerId::from(id));
                (peer, peers, peer_count)
            }
            other => panic!("expected joined, got {:?}", other),
        }
    }

    pub async fn send(&mut self, msg: &SignalMessage) {
        let json = serde_json::to_string(msg).unwrap();
        self.send_raw(&json).await;
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.ws
            .send(Message::Text(text.to_string()))
            .await
            .expect("send to relay");
    }

    /// Next parsed envelope, skipping non-text frames.
    pub async fn recv(&mut self) -> SignalMessage {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .expect("timed out waiting for envelope")
                .expect("relay closed the connection")
                .expect("websocket error");
            if let Message::Text(text) = frame {
                return serde_json::from_str(&text).expect("unparseable envelope from relay");
            }
        }
    }

    /// Assert that nothing arrives within `window`.
    pub async fn expect_silence(&mut self, window: Duration) {
        let deadline = tokio::time::Instant::now() + window;
        loop {
            match tokio::time::timeout_at(deadline, self.ws.next()).await {
                Err(_) => return,
                Ok(Some(Ok(Message::Text(text)))) => panic!("unexpected envelope: {}", text),
                Ok(Some(Ok(_))) => continue,
                Ok(Some(Err(e))) => panic!("websocket error: {}", e),
                Ok(None) => panic!("relay closed the connection"),
            }
        }
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}
