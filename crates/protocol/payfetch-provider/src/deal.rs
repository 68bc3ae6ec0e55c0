//! Deals and the ongoing-deals table.
//!
//! A [`Deal`] is the mutable unit of work: negotiated terms, delivery
//! progress, and an exclusively-held handle to its connection's outbound
//! sink. [`OngoingDeals`] keys deals by `(connection, deal id)`, so ids only
//! need to be unique per connection and one connection's teardown removes
//! exactly its own deals.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use payfetch_types::{Cid, DealId, DealStatus, DealTerms};
use serde::Serialize;

use crate::error::{ProviderError, ProviderResult};
use crate::sink::MessageSink;

/// Provider-assigned identifier for one attached connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of one deal in the ongoing-deals table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DealKey {
    /// Connection the deal arrived on
    pub connection: ConnectionId,
    /// Requester-assigned deal id
    pub deal: DealId,
}

/// One in-flight retrieval deal.
#[derive(Debug)]
pub struct Deal {
    /// Requester-assigned id
    pub id: DealId,
    /// Connection the deal lives on
    pub connection: ConnectionId,
    /// Current lifecycle status
    pub status: DealStatus,
    /// Content being retrieved
    pub cid: Cid,
    /// Negotiated terms; the payment interval grows per cycle
    pub terms: DealTerms,
    /// Outbound sink of the deal's connection
    pub sink: MessageSink,
    /// Bytes released so far; monotonically non-decreasing
    pub size_sent: u64,
    /// Time of the last message that advanced this deal
    pub last_activity: Instant,
}

impl Deal {
    /// Create a deal in the `AwaitingAcceptance` state.
    pub fn new(
        id: DealId,
        connection: ConnectionId,
        cid: Cid,
        terms: DealTerms,
        sink: MessageSink,
    ) -> Self {
        Self {
            id,
            connection,
            status: DealStatus::AwaitingAcceptance,
            cid,
            terms,
            sink,
            size_sent: 0,
            last_activity: Instant::now(),
        }
    }

    /// The table key for this deal.
    pub fn key(&self) -> DealKey {
        DealKey {
            connection: self.connection,
            deal: self.id,
        }
    }

    /// Record activity, deferring idle expiry.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Whether the deal has been inactive for at least `ttl`.
    pub fn is_idle(&self, ttl: Duration) -> bool {
        self.last_activity.elapsed() >= ttl
    }

    /// Observability view of this deal.
    pub fn snapshot(&self) -> DealSnapshot {
        DealSnapshot {
            connection: self.connection,
            deal: self.id,
            cid: self.cid.clone(),
            status: self.status,
            size_sent: self.size_sent,
            size: self.terms.size,
            payment_interval: self.terms.payment_interval,
        }
    }
}

/// Point-in-time view of one deal, pushed to the event sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealSnapshot {
    /// Connection the deal lives on
    pub connection: ConnectionId,
    /// Requester-assigned deal id
    pub deal: DealId,
    /// Content being retrieved
    pub cid: Cid,
    /// Current lifecycle status
    pub status: DealStatus,
    /// Bytes released so far
    pub size_sent: u64,
    /// Total content size
    pub size: u64,
    /// Current payment interval
    pub payment_interval: u64,
}

/// The table of in-flight deals for one provider instance.
#[derive(Default)]
pub struct OngoingDeals {
    deals: HashMap<DealKey, Deal>,
}

impl OngoingDeals {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a deal is in flight under this key.
    pub fn contains(&self, key: DealKey) -> bool {
        self.deals.contains_key(&key)
    }

    /// Insert a new deal.
    ///
    /// Returns `DealExists` if the key is occupied; the table is unchanged.
    pub fn insert(&mut self, deal: Deal) -> ProviderResult<()> {
        let key = deal.key();
        if self.deals.contains_key(&key) {
            return Err(ProviderError::DealExists(key.deal));
        }
        self.deals.insert(key, deal);
        Ok(())
    }

    /// Get a deal mutably.
    pub fn get_mut(&mut self, key: DealKey) -> Option<&mut Deal> {
        self.deals.get_mut(&key)
    }

    /// Remove one deal, returning it if present.
    pub fn remove(&mut self, key: DealKey) -> Option<Deal> {
        self.deals.remove(&key)
    }

    /// Remove every deal belonging to a connection, returning them.
    pub fn remove_connection(&mut self, connection: ConnectionId) -> Vec<Deal> {
        let keys: Vec<DealKey> = self
            .deals
            .keys()
            .filter(|k| k.connection == connection)
            .copied()
            .collect();
        keys.into_iter()
            .filter_map(|k| self.deals.remove(&k))
            .collect()
    }

    /// Remove every deal idle for at least `ttl`, returning them.
    pub fn remove_idle(&mut self, ttl: Duration) -> Vec<Deal> {
        let keys: Vec<DealKey> = self
            .deals
            .values()
            .filter(|d| d.is_idle(ttl))
            .map(Deal::key)
            .collect();
        keys.into_iter()
            .filter_map(|k| self.deals.remove(&k))
            .collect()
    }

    /// Number of in-flight deals.
    pub fn len(&self) -> usize {
        self.deals.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.deals.is_empty()
    }

    /// Snapshot every deal, ordered by key for stable output.
    pub fn snapshot(&self) -> Vec<DealSnapshot> {
        let mut snapshots: Vec<DealSnapshot> = self.deals.values().map(Deal::snapshot).collect();
        snapshots.sort_by_key(|s| (s.connection, s.deal));
        snapshots
    }
}
