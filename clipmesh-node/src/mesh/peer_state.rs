use clipmesh_core::PeerId;

/// Lifecycle of one pairwise connection. `Closed` is terminal: retrying
/// requires a fresh transport, there is no automatic reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    /// Remote id is known but nothing has been exchanged; the non-initiator
    /// side waits here for an offer.
    Idle,
    Negotiating(NegotiationPhase),
    /// The data channel reported open. Only the transport's own open signal
    /// moves a peer here, never a mere description exchange.
    Connected,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationPhase {
    /// Offer created and installed locally, not yet handed to the relay.
    OfferSent,
    /// Offer is on its way; waiting for the answer.
    AwaitingAnswer,
    /// Responder side: answer produced, waiting for the channel to open.
    AnswerSent,
    /// Initiator side: answer applied, waiting for the channel to open.
    /// Further answers from this peer are no longer acceptable.
    AnswerApplied,
}

impl PeerState {
    pub fn is_connected(self) -> bool {
        matches!(self, PeerState::Connected)
    }

    /// True while an inbound answer is acceptable.
    pub fn awaits_answer(self) -> bool {
        matches!(
            self,
            PeerState::Negotiating(NegotiationPhase::OfferSent)
                | PeerState::Negotiating(NegotiationPhase::AwaitingAnswer)
        )
    }
}

/// Deterministic tie-break: for any ordered pair of distinct ids, exactly one
/// side initiates, and both sides agree on which without coordination. The
/// smaller id under byte-wise string ordering creates the offer.
pub fn initiates(local: &PeerId, remote: &PeerId) -> bool {
    local < remote
}
