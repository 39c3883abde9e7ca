use crate::transport::{TransportConfig, TransportEvent};
use anyhow::{Context, Result};
use bytes::Bytes;
use clipmesh_core::PeerId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::APIBuilder;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::RTCPeerConnection;

/// One WebRTC connection toward a single remote peer, reduced to the opaque
/// capability the mesh needs: produce/apply session descriptions, feed ICE
/// candidates, and push events into the mesh loop.
///
/// Candidates that arrive before the remote description is applied are queued
/// in arrival order and drained right after it is; trickled candidates are
/// not synchronized with the SDP exchange, so early arrival is expected.
pub struct PeerTransport {
    peer_id: PeerId,
    pc: Arc<RTCPeerConnection>,
    channel: Arc<Mutex<Option<Arc<RTCDataChannel>>>>,
    pending_candidates: Arc<Mutex<Vec<RTCIceCandidateInit>>>,
    remote_description_set: Arc<AtomicBool>,
    event_tx: mpsc::Sender<TransportEvent>,
}

impl PeerTransport {
    pub async fn new(
        peer_id: PeerId,
        config: TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = if config.ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: config.ice_servers,
                ..Default::default()
            }]
        };
        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let pc = Arc::new(api.new_peer_connection(rtc_config).await?);
        let channel: Arc<Mutex<Option<Arc<RTCDataChannel>>>> = Arc::new(Mutex::new(None));

        // Failed and Disconnected get the same treatment as a deliberate
        // close: tear down, no retry.
        let state_tx = event_tx.clone();
        let state_id = peer_id.clone();
        pc.on_peer_connection_state_change(Box::new(move |state: RTCPeerConnectionState| {
            let tx = state_tx.clone();
            let id = state_id.clone();
            Box::pin(async move {
                info!("Peer {}... connection state: {:?}", id.short(), state);
                match state {
                    RTCPeerConnectionState::Failed
                    | RTCPeerConnectionState::Disconnected
                    | RTCPeerConnectionState::Closed => {
                        let _ = tx.send(TransportEvent::Closed(id)).await;
                    }
                    _ => {}
                }
            })
        }));

        // Trickle ICE: surface local candidates for the relay.
        let ice_tx = event_tx.clone();
        let ice_id = peer_id.clone();
        pc.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let id = ice_id.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else { return };
                let Ok(init) = candidate.to_json() else { return };
                let Ok(json) = serde_json::to_string(&init) else { return };
                let _ = tx.send(TransportEvent::LocalCandidate(id, json)).await;
            })
        }));

        // Non-initiator side: the remote creates the channel.
        let dc_slot = channel.clone();
        let dc_tx = event_tx.clone();
        let dc_id = peer_id.clone();
        pc.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let slot = dc_slot.clone();
            let tx = dc_tx.clone();
            let id = dc_id.clone();
            Box::pin(async move {
                debug!("Peer {}... opened data channel '{}'", id.short(), dc.label());
                wire_channel(dc, id, slot, tx).await;
            })
        }));

        Ok(Self {
            peer_id,
            pc,
            channel,
            pending_candidates: Arc::new(Mutex::new(Vec::new())),
            remote_description_set: Arc::new(AtomicBool::new(false)),
            event_tx,
        })
    }

    /// Initiator path: create the data channel, then an offer, and install it
    /// as the local description. Returns the offer SDP.
    pub async fn create_offer(&self) -> Result<String> {
        let dc = self
            .pc
            .create_data_channel("clipboard", None)
            .await
            .context("failed to create data channel")?;
        wire_channel(
            dc,
            self.peer_id.clone(),
            self.channel.clone(),
            self.event_tx.clone(),
        )
        .await;

        let offer = self.pc.create_offer(None).await?;
        self.pc.set_local_description(offer.clone()).await?;
        Ok(offer.sdp)
    }

    /// Responder path: apply the remote offer and answer it. Returns the
    /// answer SDP.
    pub async fn apply_offer(&self, sdp: String) -> Result<String> {
        let desc = RTCSessionDescription::offer(sdp)?;
        self.pc.set_remote_description(desc).await?;
        self.mark_remote_description_set().await?;

        let answer = self.pc.create_answer(None).await?;
        self.pc.set_local_description(answer.clone()).await?;
        Ok(answer.sdp)
    }

    pub async fn apply_answer(&self, sdp: String) -> Result<()> {
        let desc = RTCSessionDescription::answer(sdp)?;
        self.pc.set_remote_description(desc).await?;
        self.mark_remote_description_set().await?;
        Ok(())
    }

    /// Apply a trickled candidate, queueing it if the remote description is
    /// not in place yet.
    pub async fn add_remote_candidate(&self, candidate_json: &str) -> Result<()> {
        let init: RTCIceCandidateInit =
            serde_json::from_str(candidate_json).context("failed to parse ICE candidate JSON")?;

        if !self.remote_description_set.load(Ordering::Acquire) {
            debug!(
                "Peer {}... candidate before remote description, queueing",
                self.peer_id.short()
            );
            self.pending_candidates.lock().await.push(init);
            return Ok(());
        }

        self.pc.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn mark_remote_description_set(&self) -> Result<()> {
        self.remote_description_set.store(true, Ordering::Release);
        let queued: Vec<RTCIceCandidateInit> =
            self.pending_candidates.lock().await.drain(..).collect();
        for init in queued {
            if let Err(e) = self.pc.add_ice_candidate(init).await {
                warn!(
                    "Peer {}... failed to apply queued candidate: {}",
                    self.peer_id.short(),
                    e
                );
            }
        }
        Ok(())
    }

    /// Send bytes on the open data channel.
    pub async fn send(&self, data: &Bytes) -> Result<()> {
        let guard = self.channel.lock().await;
        let dc = guard
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no data channel toward {}", self.peer_id))?;
        dc.send(data).await?;
        Ok(())
    }

    pub async fn close(&self) -> Result<()> {
        if let Some(dc) = self.channel.lock().await.take() {
            let _ = dc.close().await;
        }
        self.pc.close().await?;
        Ok(())
    }
}

/// Shared between the initiator-created and remotely-opened channel: stash
/// the handle and forward open/message signals into the mesh loop.
async fn wire_channel(
    dc: Arc<RTCDataChannel>,
    peer_id: PeerId,
    slot: Arc<Mutex<Option<Arc<RTCDataChannel>>>>,
    event_tx: mpsc::Sender<TransportEvent>,
) {
    *slot.lock().await = Some(dc.clone());

    let open_tx = event_tx.clone();
    let open_id = peer_id.clone();
    dc.on_open(Box::new(move || {
        let tx = open_tx.clone();
        let id = open_id.clone();
        Box::pin(async move {
            info!("Data channel open toward {}...", id.short());
            let _ = tx.send(TransportEvent::ChannelOpen(id)).await;
        })
    }));

    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = event_tx.clone();
        let id = peer_id.clone();
        Box::pin(async move {
            let data = Bytes::from(msg.data.to_vec());
            let _ = tx.send(TransportEvent::Message(id, data)).await;
        })
    }));
}
