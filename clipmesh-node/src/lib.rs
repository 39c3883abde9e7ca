//! A clipmesh node: joins a room through the signaling relay, negotiates a
//! WebRTC data channel per peer, and keeps local content in sync with the
//! room over those channels.

pub mod config;
pub mod event;
pub mod mesh;
pub mod relay_link;
pub mod sync;
pub mod transport;

pub use config::NodeConfig;
pub use event::NodeEvent;
pub use sync::{Clipboard, MemoryClipboard, SyncEngine, DEFAULT_POLL_INTERVAL};
pub use transport::TransportConfig;

use crate::mesh::{MeshCommand, MeshManager};
use anyhow::{Context, Result};
use bytes::Bytes;
use clipmesh_core::{PeerId, SignalMessage, SyncMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// A running node. Dropping it does not stop the background tasks; call
/// [`shutdown`](Self::shutdown) to close peer connections cleanly.
pub struct Node {
    local_id: PeerId,
    engine: Arc<SyncEngine>,
    command_tx: mpsc::Sender<MeshCommand>,
    events: Option<mpsc::Receiver<NodeEvent>>,
}

impl Node {
    /// Connect to the relay, join the configured room and start syncing
    /// `clipboard`. Fails fast when the relay is unreachable; everything
    /// after the join handshake runs in background tasks.
    pub async fn start(config: NodeConfig, clipboard: Arc<dyn Clipboard>) -> Result<Self> {
        let local_id = config.peer_id.clone().unwrap_or_else(PeerId::generate);

        let socket = relay_link::connect(&config.server_url)
            .await
            .context("relay connection failed")?;

        let (inbound_tx, inbound_rx) = mpsc::channel::<SignalMessage>(64);
        let (outbound_tx, outbound_rx) = mpsc::channel::<SignalMessage>(64);
        let (mesh_event_tx, mut mesh_event_rx) = mpsc::channel::<NodeEvent>(64);
        let (public_tx, public_rx) = mpsc::channel::<NodeEvent>(64);
        let (command_tx, command_rx) = mpsc::channel::<MeshCommand>(16);
        let (sync_tx, mut sync_rx) = mpsc::channel::<SyncMessage>(16);

        let join = SignalMessage::Join {
            code: config.room.as_str().to_string(),
            peer_id: Some(local_id.clone()),
        };
        tokio::spawn(relay_link::pump(socket, join, inbound_tx, outbound_rx));

        let mesh = MeshManager::new(
            local_id.clone(),
            config.transport.clone(),
            outbound_tx,
            mesh_event_tx,
        );
        tokio::spawn(mesh.run(inbound_rx, command_rx));

        let engine = Arc::new(SyncEngine::new(clipboard, sync_tx, config.poll_interval));

        // Local content changes flow out as broadcast frames.
        let broadcast_tx = command_tx.clone();
        tokio::spawn(async move {
            while let Some(msg) = sync_rx.recv().await {
                let frame = match serde_json::to_vec(&msg) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!("Failed to encode sync frame: {}", e);
                        continue;
                    }
                };
                if broadcast_tx
                    .send(MeshCommand::Broadcast(Bytes::from(frame)))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });

        // Mesh events feed the sync engine and, best effort, the embedder.
        // Public events are advisory; they are dropped when the consumer lags
        // or never subscribed, so the sync path cannot stall on them.
        let inbound_engine = engine.clone();
        tokio::spawn(async move {
            while let Some(event) = mesh_event_rx.recv().await {
                if let NodeEvent::Message { from, data } = &event {
                    match serde_json::from_slice::<SyncMessage>(data) {
                        Ok(msg) => inbound_engine.apply_inbound(&msg),
                        Err(e) => debug!("Undecodable frame from {}...: {}", from.short(), e),
                    }
                }
                let _ = public_tx.try_send(event);
            }
        });

        engine.start();

        Ok(Self {
            local_id,
            engine,
            command_tx,
            events: Some(public_rx),
        })
    }

    pub fn local_id(&self) -> &PeerId {
        &self.local_id
    }

    /// Take the event stream. Returns `None` after the first call.
    pub fn events(&mut self) -> Option<mpsc::Receiver<NodeEvent>> {
        self.events.take()
    }

    /// Current (connected, total known) peer counts.
    pub async fn peer_counts(&self) -> Result<(usize, usize)> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(MeshCommand::Counts(reply_tx))
            .await
            .context("mesh loop is gone")?;
        reply_rx.await.context("mesh loop dropped the reply")
    }

    /// Stop polling and close every peer connection.
    pub async fn shutdown(&self) {
        self.engine.stop();
        let _ = self.command_tx.send(MeshCommand::Shutdown).await;
    }
}
