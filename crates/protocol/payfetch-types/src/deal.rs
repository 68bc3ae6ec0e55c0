//! Deal identifiers, proposals and negotiated terms.
//!
//! A requester proposes a [`DealProposal`]; the provider validates it against
//! its pricing policy and, if acceptable, the proposal becomes the deal's
//! live [`DealTerms`]. Terms are immutable once accepted except for the
//! payment interval, which grows by the agreed increase after every payment
//! cycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Amount;

/// Requester-assigned identifier naming one deal.
///
/// Ids are only meaningful within the connection that proposed them; the
/// provider scopes its deal table per connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DealId(pub u64);

impl fmt::Display for DealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque wallet identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddr(String);

impl WalletAddr {
    /// Wrap an existing wallet address string.
    pub fn new(addr: impl Into<String>) -> Self {
        WalletAddr(addr.into())
    }

    /// The address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Terms proposed by a requester in a new-deal request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealProposal {
    /// Provider wallet the requester intends to pay
    pub wallet: WalletAddr,
    /// Total content size in bytes, as the requester believes it to be
    pub size: u64,
    /// Offered price in atto-units per byte
    pub price_per_byte: Amount,
    /// Bytes released before the next payment is required
    pub payment_interval: u64,
    /// Bytes added to the interval after each payment cycle
    pub payment_interval_increase: u64,
}

/// Negotiated parameters of one accepted deal.
///
/// All fields are fixed at acceptance except `payment_interval`, which grows
/// monotonically via [`DealTerms::grow_interval`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealTerms {
    /// Wallet receiving the deal's payments
    pub wallet: WalletAddr,
    /// Total content size in bytes
    pub size: u64,
    /// Price in atto-units per byte
    pub price_per_byte: Amount,
    /// Current payment interval in bytes
    pub payment_interval: u64,
    /// Per-cycle interval increase in bytes
    pub payment_interval_increase: u64,
}

impl DealTerms {
    /// Create deal terms.
    pub fn new(
        wallet: WalletAddr,
        size: u64,
        price_per_byte: Amount,
        payment_interval: u64,
        payment_interval_increase: u64,
    ) -> Self {
        Self {
            wallet,
            size,
            price_per_byte,
            payment_interval,
            payment_interval_increase,
        }
    }

    /// Adopt a validated proposal as the deal's live terms.
    pub fn from_proposal(proposal: &DealProposal) -> Self {
        Self {
            wallet: proposal.wallet.clone(),
            size: proposal.size,
            price_per_byte: proposal.price_per_byte,
            payment_interval: proposal.payment_interval,
            payment_interval_increase: proposal.payment_interval_increase,
        }
    }

    /// Grow the payment interval by the agreed increase.
    ///
    /// Called once per completed delivery cycle, so each successive payment
    /// buys an equal or larger increment.
    pub fn grow_interval(&mut self) {
        self.payment_interval = self
            .payment_interval
            .saturating_add(self.payment_interval_increase);
    }

    /// Total price of the full content at the agreed rate.
    pub fn total_price(&self) -> Amount {
        self.price_per_byte.saturating_mul(self.size)
    }

    /// Price of `bytes` at the agreed rate.
    pub fn price_of(&self, bytes: u64) -> Amount {
        self.price_per_byte.saturating_mul(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_terms() -> DealTerms {
        DealTerms::new(WalletAddr::new("f1wallet"), 1000, 1000, 500, 100)
    }

    #[test]
    fn test_deal_id_display() {
        assert_eq!(DealId(42).to_string(), "42");
    }

    #[test]
    fn test_grow_interval_monotonic() {
        let mut terms = test_terms();
        assert_eq!(terms.payment_interval, 500);

        terms.grow_interval();
        assert_eq!(terms.payment_interval, 600);

        terms.grow_interval();
        assert_eq!(terms.payment_interval, 700);
    }

    #[test]
    fn test_grow_interval_saturates() {
        let mut terms = test_terms();
        terms.payment_interval = u64::MAX - 50;
        terms.grow_interval();
        assert_eq!(terms.payment_interval, u64::MAX);
    }

    #[test]
    fn test_pricing() {
        let terms = test_terms();
        assert_eq!(terms.total_price(), 1_000_000);
        assert_eq!(terms.price_of(600), 600_000);
    }

    #[test]
    fn test_terms_from_proposal() {
        let proposal = DealProposal {
            wallet: WalletAddr::new("f1wallet"),
            size: 2048,
            price_per_byte: 7,
            payment_interval: 256,
            payment_interval_increase: 64,
        };
        let terms = DealTerms::from_proposal(&proposal);
        assert_eq!(terms.size, 2048);
        assert_eq!(terms.payment_interval, 256);
        assert_eq!(terms.payment_interval_increase, 64);
    }

    #[test]
    fn test_proposal_wire_field_names() {
        let proposal = DealProposal {
            wallet: WalletAddr::new("f1wallet"),
            size: 10,
            price_per_byte: 2,
            payment_interval: 5,
            payment_interval_increase: 1,
        };
        let json = serde_json::to_string(&proposal).unwrap();
        assert!(json.contains("\"pricePerByte\":2"));
        assert!(json.contains("\"paymentInterval\":5"));
        assert!(json.contains("\"paymentIntervalIncrease\":1"));
    }
}
