//! Provider observability events.
//!
//! A write-only, fire-and-forget sink: emission never blocks message
//! handling and a missing or lagging consumer never affects deals.

use payfetch_types::{Cid, DealId};
use tokio::sync::mpsc;

use crate::deal::{ConnectionId, DealSnapshot};

/// Events emitted by the provider for logging/telemetry consumers.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ProviderEvent {
    /// A new deal passed term validation and was stored.
    DealAccepted {
        /// Connection the deal arrived on
        connection: ConnectionId,
        /// Requester-assigned deal id
        deal: DealId,
        /// Content being retrieved
        cid: Cid,
        /// Total content size in bytes
        size: u64,
    },

    /// A delivery cycle released content blocks.
    BlocksSent {
        /// Connection the deal lives on
        connection: ConnectionId,
        /// Deal the blocks belong to
        deal: DealId,
        /// Bytes released this cycle
        bytes: u64,
        /// Cumulative bytes released
        total_sent: u64,
    },

    /// A deal delivered everything and its final voucher was redeemed.
    DealCompleted {
        /// Connection the deal lived on
        connection: ConnectionId,
        /// The completed deal
        deal: DealId,
    },

    /// A deal or its connection was torn down before completion.
    DealFailed {
        /// Connection the failure occurred on
        connection: ConnectionId,
        /// The failed deal, when the failure names one
        deal: Option<DealId>,
        /// Human-readable failure description
        reason: String,
    },

    /// Periodic snapshot of the full ongoing-deals table.
    DealsSnapshot(Vec<DealSnapshot>),
}

/// Fire-and-forget event emitter.
#[derive(Clone)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<ProviderEvent>>,
}

impl EventSink {
    /// An emitter that discards everything.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// An emitter feeding a channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProviderEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Emit an event. Never blocks; a disconnected receiver is ignored.
    pub fn emit(&self, event: ProviderEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
