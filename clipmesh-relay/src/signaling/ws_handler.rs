use crate::signaling::RelayService;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use clipmesh_core::{PeerId, SignalMessage};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<RelayService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

async fn handle_socket(socket: WebSocket, service: RelayService) {
    info!("New relay connection");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    // Room membership of this connection, set by the first well-formed join.
    let mut membership: Option<(String, PeerId)> = None;

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<SignalMessage>(&text) {
                Ok(SignalMessage::Join { code, peer_id }) => {
                    if let Some((old_code, old_id)) = membership.take() {
                        service.leave(&old_code, &old_id, &tx);
                    }
                    let assigned = service.join(&code, peer_id, &tx);
                    membership = Some((code, assigned));
                }
                Ok(
                    msg @ (SignalMessage::Offer { .. }
                    | SignalMessage::Answer { .. }
                    | SignalMessage::Ice { .. }),
                ) => match &membership {
                    Some((code, id)) => service.route(code, id, msg),
                    None => warn!("Payload envelope before join, dropping"),
                },
                Ok(other) => {
                    debug!("Ignoring client-sent {} envelope", other.msg_type());
                }
                // Malformed data drops the single envelope only; the
                // connection stays open.
                Err(e) => warn!("Invalid envelope: {}", e),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    if let Some((code, id)) = membership {
        service.leave(&code, &id, &tx);
    }
    send_task.abort();
    info!("Relay connection closed");
}
