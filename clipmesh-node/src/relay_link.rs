use anyhow::{Context, Result};
use clipmesh_core::SignalMessage;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

pub type RelaySocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Turn a server URL into the relay's WebSocket endpoint:
/// `http(s)` becomes `ws(s)` and the `/ws` path is appended.
pub fn ws_url(server_url: &str) -> String {
    let url = server_url
        .replace("http://", "ws://")
        .replace("https://", "wss://");
    let url = url.trim_end_matches('/');
    if url.ends_with("/ws") {
        url.to_string()
    } else {
        format!("{}/ws", url)
    }
}

/// Open the WebSocket to the relay. Split out from the pump so a node can
/// fail fast when the relay is unreachable.
pub async fn connect(server_url: &str) -> Result<RelaySocket> {
    let url = ws_url(server_url);
    let (socket, _) = connect_async(&url)
        .await
        .with_context(|| format!("failed to connect to relay at {}", url))?;
    info!("Connected to signaling relay at {}", url);
    Ok(socket)
}

/// Send `join`, then pump envelopes both ways until either side closes.
/// Inbound envelopes are delivered in arrival order; malformed ones are
/// logged and dropped without killing the link.
pub async fn pump(
    mut socket: RelaySocket,
    join: SignalMessage,
    inbound_tx: mpsc::Sender<SignalMessage>,
    mut outbound_rx: mpsc::Receiver<SignalMessage>,
) {
    match serde_json::to_string(&join) {
        Ok(json) => {
            if let Err(e) = socket.send(Message::Text(json)).await {
                error!("Failed to send join: {}", e);
                return;
            }
        }
        Err(e) => {
            error!("Failed to serialize join: {}", e);
            return;
        }
    }

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => match outbound {
                Some(msg) => {
                    let json = match serde_json::to_string(&msg) {
                        Ok(json) => json,
                        Err(e) => {
                            error!("Failed to serialize {} envelope: {}", msg.msg_type(), e);
                            continue;
                        }
                    };
                    if let Err(e) = socket.send(Message::Text(json)).await {
                        error!("Relay send failed: {}", e);
                        break;
                    }
                }
                None => break,
            },

            frame = socket.next() => match frame {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<SignalMessage>(&text) {
                    Ok(msg) => {
                        debug!("Relay delivered {} envelope", msg.msg_type());
                        if inbound_tx.send(msg).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Invalid envelope from relay: {}", e),
                },
                Some(Ok(Message::Close(_))) | None => {
                    info!("Relay connection closed");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!("Relay connection error: {}", e);
                    break;
                }
            },
        }
    }
}
