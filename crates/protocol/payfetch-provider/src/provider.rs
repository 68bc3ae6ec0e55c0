//! The deal provider.
//!
//! One [`DealProvider`] instance owns the ongoing-deals table, a handle to
//! the current configuration, and the storage/payment capabilities. It is
//! shared across connections; each inbound message advances exactly one
//! deal's state and emits zero or more outbound messages on that deal's
//! sink.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use payfetch_chain::PaymentChain;
use payfetch_store::ContentStore;
use payfetch_types::{DealStatus, PaymentVoucher};
use payfetch_wire::DealMessage;
use tracing::{debug, info, warn};

use crate::config::{ConfigHandle, ProviderConfig};
use crate::deal::{ConnectionId, Deal, DealKey, DealSnapshot, OngoingDeals};
use crate::delivery::deliver_next_increment;
use crate::error::{ProviderError, ProviderResult};
use crate::events::{EventSink, ProviderEvent};
use crate::policy;
use crate::sink::MessageSink;

/// Provider-side engine for the retrieval deal protocol.
pub struct DealProvider {
    config: ConfigHandle,
    deals: Mutex<OngoingDeals>,
    store: Arc<dyn ContentStore>,
    chain: Arc<dyn PaymentChain>,
    events: EventSink,
    next_connection: AtomicU64,
}

impl DealProvider {
    /// Create a provider over the given capabilities, with events disabled.
    pub fn new(
        config: ProviderConfig,
        store: Arc<dyn ContentStore>,
        chain: Arc<dyn PaymentChain>,
    ) -> Self {
        Self {
            config: ConfigHandle::new(config),
            deals: Mutex::new(OngoingDeals::new()),
            store,
            chain,
            events: EventSink::disabled(),
            next_connection: AtomicU64::new(0),
        }
    }

    /// Attach an event sink.
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    /// The provider's reloadable configuration handle.
    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    /// Assign an id to a newly attached connection.
    pub fn next_connection_id(&self) -> ConnectionId {
        ConnectionId(self.next_connection.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn deals(&self) -> MutexGuard<'_, OngoingDeals> {
        self.deals.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Handle one inbound message, advancing its deal's state.
    ///
    /// Messages are handled strictly one at a time per connection; the
    /// dispatch loop treats any returned error as fatal for that connection
    /// and closes the pipe. Partial effects applied before a failure are
    /// deliberately retained.
    pub async fn handle_message(
        &self,
        connection: ConnectionId,
        msg: DealMessage,
        sink: &MessageSink,
    ) -> ProviderResult<()> {
        match msg.status {
            DealStatus::AwaitingAcceptance => self.handle_proposal(connection, msg, sink),
            DealStatus::PaymentChannelReady => self.handle_channel_ready(connection, msg),
            DealStatus::PaymentSent => self.handle_payment(connection, msg).await,
            DealStatus::LastPaymentSent => self.handle_last_payment(connection, msg).await,
            status => Err(ProviderError::UnexpectedStatus {
                deal: msg.deal_id,
                status,
            }),
        }
    }

    /// Handle a new-deal request.
    ///
    /// 1. Reject deal-id collisions (before any term validation)
    /// 2. Validate the proposal against a fresh config snapshot
    /// 3. Store the deal and answer `accepted`
    fn handle_proposal(
        &self,
        connection: ConnectionId,
        msg: DealMessage,
        sink: &MessageSink,
    ) -> ProviderResult<()> {
        let deal_id = msg.deal_id;
        let key = DealKey {
            connection,
            deal: deal_id,
        };

        if self.deals().contains(key) {
            return Err(ProviderError::DealExists(deal_id));
        }

        let cid = msg.cid.ok_or(ProviderError::MissingField {
            status: DealStatus::AwaitingAcceptance,
            field: "cid",
        })?;
        let params = msg.params.ok_or(ProviderError::MissingField {
            status: DealStatus::AwaitingAcceptance,
            field: "params",
        })?;

        // Pricing and hosted-content tables are read fresh on every request
        let config = self.config.current();
        let terms = policy::validate_proposal(&config, &cid, &params)?;
        let size = terms.size;

        let deal = Deal::new(deal_id, connection, cid.clone(), terms, sink.clone());
        self.deals().insert(deal)?;

        info!(
            deal = %deal_id,
            connection = %connection,
            cid = %cid,
            size,
            price_per_byte = params.price_per_byte,
            "accepted retrieval deal"
        );

        sink.send(DealMessage::accepted(deal_id));
        self.events.emit(ProviderEvent::DealAccepted {
            connection,
            deal: deal_id,
            cid,
            size,
        });
        Ok(())
    }

    /// Handle `paymentChannelReady`: release the first content increment.
    fn handle_channel_ready(
        &self,
        connection: ConnectionId,
        msg: DealMessage,
    ) -> ProviderResult<()> {
        self.deliver_increment(DealKey {
            connection,
            deal: msg.deal_id,
        })
    }

    /// Handle `paymentSent`: verify the voucher, then release the next
    /// increment.
    async fn handle_payment(
        &self,
        connection: ConnectionId,
        msg: DealMessage,
    ) -> ProviderResult<()> {
        let key = DealKey {
            connection,
            deal: msg.deal_id,
        };
        let (channel, voucher) = payment_fields(&msg, DealStatus::PaymentSent)?;

        // The voucher must cover every byte released so far
        let expected = {
            let mut deals = self.deals();
            let deal = deals
                .get_mut(key)
                .ok_or(ProviderError::UnknownDeal(msg.deal_id))?;
            deal.touch();
            deal.terms.price_of(deal.size_sent)
        };

        self.chain.verify_voucher(&channel, &voucher, expected).await?;
        debug!(
            deal = %msg.deal_id,
            connection = %connection,
            expected_amount = expected,
            "payment voucher verified"
        );

        self.deliver_increment(key)
    }

    /// Handle `lastPaymentSent`: redeem the final voucher, complete and
    /// tear down the deal.
    async fn handle_last_payment(
        &self,
        connection: ConnectionId,
        msg: DealMessage,
    ) -> ProviderResult<()> {
        let key = DealKey {
            connection,
            deal: msg.deal_id,
        };
        let (channel, voucher) = payment_fields(&msg, DealStatus::LastPaymentSent)?;

        {
            let mut deals = self.deals();
            let deal = deals
                .get_mut(key)
                .ok_or(ProviderError::UnknownDeal(msg.deal_id))?;
            deal.touch();
        }

        self.chain.submit_voucher(&channel, &voucher).await?;

        let mut deal = self
            .deals()
            .remove(key)
            .ok_or(ProviderError::UnknownDeal(msg.deal_id))?;
        deal.status = DealStatus::Completed;
        deal.sink.send(DealMessage::completed(deal.id));
        deal.sink.close();

        info!(
            deal = %deal.id,
            connection = %connection,
            cid = %deal.cid,
            size_sent = deal.size_sent,
            "retrieval deal completed"
        );
        self.events.emit(ProviderEvent::DealCompleted {
            connection,
            deal: deal.id,
        });
        Ok(())
    }

    fn deliver_increment(&self, key: DealKey) -> ProviderResult<()> {
        let mut deals = self.deals();
        let deal = deals
            .get_mut(key)
            .ok_or(ProviderError::UnknownDeal(key.deal))?;
        deal.touch();

        let response = deliver_next_increment(self.store.as_ref(), deal)?;
        let bytes = response.block_bytes();
        let total_sent = deal.size_sent;
        deal.sink.send(response);

        self.events.emit(ProviderEvent::BlocksSent {
            connection: key.connection,
            deal: key.deal,
            bytes,
            total_sent,
        });
        Ok(())
    }

    /// Drop every deal belonging to a closed connection.
    ///
    /// Returns the number of deals removed.
    pub fn remove_connection(&self, connection: ConnectionId) -> usize {
        let removed = self.deals().remove_connection(connection);
        for deal in &removed {
            self.events.emit(ProviderEvent::DealFailed {
                connection,
                deal: Some(deal.id),
                reason: "connection closed".to_string(),
            });
        }
        removed.len()
    }

    /// Expire deals idle for at least `ttl`, closing their pipes.
    ///
    /// Returns the number of deals expired.
    pub fn expire_idle_deals(&self, ttl: Duration) -> usize {
        let removed = self.deals().remove_idle(ttl);
        for deal in &removed {
            warn!(
                deal = %deal.id,
                connection = %deal.connection,
                cid = %deal.cid,
                size_sent = deal.size_sent,
                "expiring idle deal"
            );
            deal.sink.close();
            self.events.emit(ProviderEvent::DealFailed {
                connection: deal.connection,
                deal: Some(deal.id),
                reason: "idle deal expired".to_string(),
            });
        }
        removed.len()
    }

    /// Number of in-flight deals.
    pub fn deal_count(&self) -> usize {
        self.deals().len()
    }

    /// Snapshot the full ongoing-deals table.
    pub fn snapshot(&self) -> Vec<DealSnapshot> {
        self.deals().snapshot()
    }

    /// Push an ongoing-deals snapshot to the event sink.
    pub fn publish_snapshot(&self) {
        let snapshot = self.snapshot();
        debug!(deals = snapshot.len(), "publishing ongoing deals snapshot");
        self.events.emit(ProviderEvent::DealsSnapshot(snapshot));
    }
}

fn payment_fields(
    msg: &DealMessage,
    status: DealStatus,
) -> ProviderResult<(String, PaymentVoucher)> {
    let channel = msg
        .payment_channel
        .clone()
        .ok_or(ProviderError::MissingField {
            status,
            field: "paymentChannel",
        })?;
    let voucher = msg
        .payment_voucher
        .clone()
        .ok_or(ProviderError::MissingField {
            status,
            field: "paymentVoucher",
        })?;
    Ok((channel, voucher))
}
