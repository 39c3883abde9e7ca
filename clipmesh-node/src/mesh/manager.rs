use crate::event::NodeEvent;
use crate::mesh::peer_state::{initiates, NegotiationPhase, PeerState};
use crate::transport::{PeerTransport, TransportConfig, TransportEvent};
use anyhow::Result;
use bytes::Bytes;
use clipmesh_core::{PeerId, SignalMessage};
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Requests into the mesh loop.
#[derive(Debug)]
pub enum MeshCommand {
    /// Send `data` over every connected peer's data channel.
    Broadcast(Bytes),
    /// Snapshot of (connected, total known) peer counts.
    Counts(oneshot::Sender<(usize, usize)>),
    /// Close all transports and stop the loop.
    Shutdown,
}

struct PeerHandle {
    state: PeerState,
    transport: Option<PeerTransport>,
}

/// Per-node orchestrator: a map of independent pairwise connection state
/// machines driven by one event loop.
///
/// The single loop is what serializes envelope application per peer: an
/// `ice` for a peer can never overtake the `offer`/`answer` that arrived
/// before it, and a transport's async description operations finish before
/// the next signaling message is picked up.
pub struct MeshManager {
    local_id: PeerId,
    peers: HashMap<PeerId, PeerHandle>,
    transport_config: TransportConfig,
    transport_tx: mpsc::Sender<TransportEvent>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    signal_tx: mpsc::Sender<SignalMessage>,
    event_tx: mpsc::Sender<NodeEvent>,
}

impl MeshManager {
    pub fn new(
        local_id: PeerId,
        transport_config: TransportConfig,
        signal_tx: mpsc::Sender<SignalMessage>,
        event_tx: mpsc::Sender<NodeEvent>,
    ) -> Self {
        let (transport_tx, transport_rx) = mpsc::channel(256);
        Self {
            local_id,
            peers: HashMap::new(),
            transport_config,
            transport_tx,
            transport_rx,
            signal_tx,
            event_tx,
        }
    }

    pub async fn run(
        mut self,
        mut signal_rx: mpsc::Receiver<SignalMessage>,
        mut command_rx: mpsc::Receiver<MeshCommand>,
    ) {
        info!("Mesh loop started as {}", self.local_id);
        let mut relay_open = true;

        loop {
            tokio::select! {
                sig = signal_rx.recv(), if relay_open => match sig {
                    Some(sig) => self.handle_signal(sig).await,
                    None => {
                        // Relay link gone: no new peers can be discovered,
                        // but established data channels keep working.
                        warn!("Relay link closed");
                        relay_open = false;
                    }
                },

                evt = self.transport_rx.recv() => match evt {
                    Some(evt) => self.handle_transport_event(evt).await,
                    None => break,
                },

                cmd = command_rx.recv() => match cmd {
                    Some(MeshCommand::Broadcast(data)) => self.broadcast(data).await,
                    Some(MeshCommand::Counts(reply)) => {
                        let _ = reply.send(self.counts());
                    }
                    Some(MeshCommand::Shutdown) | None => break,
                },
            }
        }

        self.shutdown_all().await;
        info!("Mesh loop finished");
    }

    async fn handle_signal(&mut self, msg: SignalMessage) {
        match msg {
            SignalMessage::Joined { my_id, peers, .. } => {
                if my_id != self.local_id {
                    // The relay assigns ids when the join carried none; the
                    // tie-break must use the registered id.
                    info!("Relay assigned id {}", my_id);
                    self.local_id = my_id;
                }
                for peer in peers {
                    self.discovered(peer).await;
                }
            }
            SignalMessage::PeerJoined { peer_id } => self.discovered(peer_id).await,
            SignalMessage::Offer {
                from_peer: Some(from),
                sdp,
                ..
            } => self.handle_offer(from, sdp).await,
            SignalMessage::Answer {
                from_peer: Some(from),
                sdp,
                ..
            } => self.handle_answer(from, sdp).await,
            SignalMessage::Ice {
                from_peer: Some(from),
                candidate,
                ..
            } => self.handle_candidate(from, candidate).await,
            SignalMessage::PeerLeft { peer_id } => self.teardown(&peer_id, "peer left").await,
            other => debug!("Ignoring {} envelope from relay", other.msg_type()),
        }
    }

    /// A remote id became known, through the join reply's peer list or a
    /// later `peer_joined`. The tie-break decides whether this side opens
    /// the connection or waits for an offer.
    async fn discovered(&mut self, remote: PeerId) {
        if remote == self.local_id || self.peers.contains_key(&remote) {
            return;
        }

        if initiates(&self.local_id, &remote) {
            info!("Initiating connection to {}...", remote.short());
            if let Err(e) = self.start_offer(remote.clone()).await {
                error!("Negotiation toward {}... failed: {:#}", remote.short(), e);
                self.teardown(&remote, "offer failed").await;
                return;
            }
        } else {
            info!("Waiting for offer from {}...", remote.short());
            self.peers.insert(
                remote,
                PeerHandle {
                    state: PeerState::Idle,
                    transport: None,
                },
            );
        }
        self.emit_counts().await;
    }

    async fn start_offer(&mut self, remote: PeerId) -> Result<()> {
        let transport = PeerTransport::new(
            remote.clone(),
            self.transport_config.clone(),
            self.transport_tx.clone(),
        )
        .await?;
        let sdp = transport.create_offer().await?;

        self.peers.insert(
            remote.clone(),
            PeerHandle {
                state: PeerState::Negotiating(NegotiationPhase::OfferSent),
                transport: Some(transport),
            },
        );

        self.send_signal(SignalMessage::Offer {
            target_peer: Some(remote.clone()),
            from_peer: None,
            sdp,
        })
        .await;
        if let Some(handle) = self.peers.get_mut(&remote) {
            handle.state = PeerState::Negotiating(NegotiationPhase::AwaitingAnswer);
        }
        Ok(())
    }

    async fn handle_offer(&mut self, from: PeerId, sdp: String) {
        if let Some(handle) = self.peers.get(&from) {
            if handle.transport.is_some() {
                // Tie-break rules this out unless the remote is buggy.
                warn!(
                    "Unexpected offer from {}... in state {:?}, dropping",
                    from.short(),
                    handle.state
                );
                return;
            }
        }

        let answer = async {
            let transport = PeerTransport::new(
                from.clone(),
                self.transport_config.clone(),
                self.transport_tx.clone(),
            )
            .await?;
            let answer = transport.apply_offer(sdp).await?;
            anyhow::Ok((transport, answer))
        }
        .await;

        match answer {
            Ok((transport, sdp)) => {
                self.peers.insert(
                    from.clone(),
                    PeerHandle {
                        state: PeerState::Negotiating(NegotiationPhase::AnswerSent),
                        transport: Some(transport),
                    },
                );
                self.send_signal(SignalMessage::Answer {
                    target_peer: Some(from),
                    from_peer: None,
                    sdp,
                })
                .await;
                self.emit_counts().await;
            }
            Err(e) => {
                error!("Failed to answer offer from {}...: {:#}", from.short(), e);
                self.teardown(&from, "answer failed").await;
            }
        }
    }

    async fn handle_answer(&mut self, from: PeerId, sdp: String) {
        let Some(handle) = self.peers.get(&from) else {
            warn!("Answer from unknown peer {}..., dropping", from.short());
            return;
        };
        if !handle.state.awaits_answer() {
            warn!(
                "Answer from {}... in state {:?}, dropping",
                from.short(),
                handle.state
            );
            return;
        }

        let applied = match &handle.transport {
            Some(transport) => transport.apply_answer(sdp).await,
            None => Err(anyhow::anyhow!("no transport")),
        };
        match applied {
            Ok(()) => {
                // Leave the answer-acceptance window so a duplicate answer
                // from a buggy remote is dropped instead of re-applied.
                // Connected only once the channel-open signal fires.
                if let Some(handle) = self.peers.get_mut(&from) {
                    handle.state = PeerState::Negotiating(NegotiationPhase::AnswerApplied);
                }
            }
            Err(e) => {
                error!("Failed to apply answer from {}...: {:#}", from.short(), e);
                self.teardown(&from, "answer rejected").await;
            }
        }
    }

    async fn handle_candidate(&mut self, from: PeerId, candidate: String) {
        let Some(handle) = self.peers.get(&from) else {
            debug!("Candidate from unknown peer {}..., dropping", from.short());
            return;
        };
        let Some(transport) = &handle.transport else {
            debug!(
                "Candidate from {}... before any description, dropping",
                from.short()
            );
            return;
        };
        if let Err(e) = transport.add_remote_candidate(&candidate).await {
            warn!("Failed to add candidate from {}...: {:#}", from.short(), e);
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::ChannelOpen(peer) => {
                if let Some(handle) = self.peers.get_mut(&peer) {
                    info!("Connected to {}...", peer.short());
                    handle.state = PeerState::Connected;
                    self.emit_counts().await;
                }
            }
            TransportEvent::Message(from, data) => {
                let _ = self.event_tx.send(NodeEvent::Message { from, data }).await;
            }
            TransportEvent::LocalCandidate(peer, candidate) => {
                self.send_signal(SignalMessage::Ice {
                    target_peer: Some(peer),
                    from_peer: None,
                    candidate,
                })
                .await;
            }
            TransportEvent::Closed(peer) => self.teardown(&peer, "transport closed").await,
        }
    }

    async fn broadcast(&mut self, data: Bytes) {
        let mut failed = Vec::new();
        for (peer, handle) in &self.peers {
            if !handle.state.is_connected() {
                continue;
            }
            let Some(transport) = &handle.transport else {
                continue;
            };
            if let Err(e) = transport.send(&data).await {
                warn!("Send to {}... failed: {:#}", peer.short(), e);
                failed.push(peer.clone());
            }
        }
        for peer in failed {
            self.teardown(&peer, "send failed").await;
        }
    }

    /// Remove the peer, close its transport and report the new counts. The
    /// state machine ends in `Closed`; reconnecting takes a fresh transport.
    async fn teardown(&mut self, peer: &PeerId, reason: &str) {
        let Some(mut handle) = self.peers.remove(peer) else {
            return;
        };
        handle.state = PeerState::Closed;
        if let Some(transport) = handle.transport.take() {
            let _ = transport.close().await;
        }
        info!("Peer {}... closed: {}", peer.short(), reason);
        self.emit_counts().await;
    }

    async fn shutdown_all(&mut self) {
        for (_, mut handle) in self.peers.drain() {
            handle.state = PeerState::Closed;
            if let Some(transport) = handle.transport.take() {
                let _ = transport.close().await;
            }
        }
        self.emit_counts().await;
    }

    fn counts(&self) -> (usize, usize) {
        let connected = self
            .peers
            .values()
            .filter(|h| h.state.is_connected())
            .count();
        (connected, self.peers.len())
    }

    async fn emit_counts(&self) {
        let (connected, total) = self.counts();
        let _ = self
            .event_tx
            .send(NodeEvent::PeerCountChanged { connected, total })
            .await;
    }

    async fn send_signal(&self, msg: SignalMessage) {
        if self.signal_tx.send(msg).await.is_err() {
            warn!("Relay link is down, dropping outbound signal");
        }
    }
}
