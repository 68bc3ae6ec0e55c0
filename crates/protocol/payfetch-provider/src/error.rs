//! Error types for the provider.
//!
//! Variants partition into the three failure classes the dispatch loop
//! distinguishes: policy rejections (a new-deal request the provider will
//! not take), protocol violations (a message the protocol does not allow),
//! and unexpected failures (storage, payment chain, missing deals).

use payfetch_chain::ChainError;
use payfetch_store::StoreError;
use payfetch_types::{Amount, Cid, DealId, DealStatus, WalletAddr};
use thiserror::Error;

/// Result type for provider operations.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur while handling a deal message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    // =========================================================================
    // Policy Rejections
    // =========================================================================
    /// A deal with this id is already in flight on this connection.
    #[error("deal {0} already exists")]
    DealExists(DealId),

    /// The requested content id is not hosted (no metadata or no price).
    #[error("unknown content: {0}")]
    UnknownContent(Cid),

    /// The requester addressed a wallet other than the provider's.
    #[error("wallet mismatch: offered {offered}, expected {expected}")]
    WalletMismatch {
        /// Wallet named in the proposal
        offered: WalletAddr,
        /// Provider's configured wallet
        expected: WalletAddr,
    },

    /// The offered price per byte is below the provider's price.
    #[error("price per byte too low: offered {offered}, required {required}")]
    PriceBelowMinimum {
        /// Offered price in atto per byte
        offered: Amount,
        /// Provider's resolved price in atto per byte
        required: Amount,
    },

    /// The offered payment interval exceeds the provider's maximum.
    #[error("payment interval too large: offered {offered}, maximum {maximum}")]
    IntervalAboveMaximum {
        /// Offered interval in bytes
        offered: u64,
        /// Provider's configured maximum
        maximum: u64,
    },

    /// The offered interval increase exceeds the provider's maximum.
    #[error("payment interval increase too large: offered {offered}, maximum {maximum}")]
    IncreaseAboveMaximum {
        /// Offered increase in bytes
        offered: u64,
        /// Provider's configured maximum
        maximum: u64,
    },

    // =========================================================================
    // Protocol Violations
    // =========================================================================
    /// The message status is not one the provider handles.
    #[error("unexpected message status {status} for deal {deal}")]
    UnexpectedStatus {
        /// Deal the message named
        deal: DealId,
        /// The offending status
        status: DealStatus,
    },

    /// A field required by the message's status was absent.
    #[error("message with status {status} is missing field `{field}`")]
    MissingField {
        /// Status of the offending message
        status: DealStatus,
        /// Name of the absent field
        field: &'static str,
    },

    // =========================================================================
    // Unexpected Failures
    // =========================================================================
    /// A non-new-deal message named a deal that is not in flight.
    #[error("unknown deal: {0}")]
    UnknownDeal(DealId),

    /// Storage error while pulling content.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Payment chain error while verifying or redeeming a voucher.
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),
}

impl ProviderError {
    /// True for new-deal rejections under the provider's pricing policy.
    pub fn is_policy_rejection(&self) -> bool {
        matches!(
            self,
            Self::DealExists(_)
                | Self::UnknownContent(_)
                | Self::WalletMismatch { .. }
                | Self::PriceBelowMinimum { .. }
                | Self::IntervalAboveMaximum { .. }
                | Self::IncreaseAboveMaximum { .. }
        )
    }

    /// True for messages the protocol does not allow at all.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedStatus { .. } | Self::MissingField { .. }
        )
    }
}
