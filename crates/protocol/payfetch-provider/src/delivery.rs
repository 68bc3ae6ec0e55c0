//! Metered content delivery.
//!
//! One delivery cycle releases the next payment-interval's worth of content:
//! the provider never sends more than one unpaid interval ahead of the last
//! verified payment.

use payfetch_store::ContentStore;
use payfetch_types::{DealStatus, MIN_PAYMENT_INTERVAL};
use payfetch_wire::{Block, DealMessage};
use tracing::debug;

use crate::deal::Deal;
use crate::error::ProviderResult;

/// Run one delivery cycle for a deal.
///
/// Pulls chunks starting at the deal's `size_sent` offset until accumulated
/// bytes reach or exceed the current payment interval; the last chunk may
/// overshoot (no sub-chunk splitting). At least one chunk is pulled per
/// cycle, so even a degenerate interval makes progress. Afterwards the
/// interval grows by the agreed increase, `size_sent` advances, and the
/// response is `FundsNeededLastPayment` iff everything has been released,
/// else `FundsNeeded`.
pub fn deliver_next_increment(
    store: &dyn ContentStore,
    deal: &mut Deal,
) -> ProviderResult<DealMessage> {
    let interval = deal.terms.payment_interval.max(MIN_PAYMENT_INTERVAL);

    let mut chunks = store.fetch(&deal.cid, deal.size_sent)?;
    let mut blocks = Vec::new();
    let mut sent: u64 = 0;
    while sent < interval {
        match chunks.next() {
            Some(chunk) => {
                let chunk = chunk?;
                sent += chunk.len() as u64;
                blocks.push(Block::new(chunk));
            }
            None => break,
        }
    }
    drop(chunks);

    deal.terms.grow_interval();
    deal.size_sent += sent;

    let status = if deal.size_sent >= deal.terms.size {
        DealStatus::FundsNeededLastPayment
    } else {
        DealStatus::FundsNeeded
    };
    deal.status = status;

    debug!(
        deal = %deal.id,
        connection = %deal.connection,
        bytes = sent,
        blocks = blocks.len(),
        size_sent = deal.size_sent,
        size = deal.terms.size,
        next_interval = deal.terms.payment_interval,
        status = %status,
        "delivered content increment"
    );

    Ok(match status {
        DealStatus::FundsNeededLastPayment => {
            DealMessage::funds_needed_last_payment(deal.id, blocks)
        }
        _ => DealMessage::funds_needed(deal.id, blocks),
    })
}
