//! Error types for the payment-channel capability.

use thiserror::Error;

/// Result type for chain operations.
pub type ChainResult<T> = std::result::Result<T, ChainError>;

/// Errors that can occur while verifying or redeeming vouchers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChainError {
    /// The voucher failed validation (bad signature, wrong lane, replayed
    /// nonce, or any state the implementation cannot positively verify).
    #[error("voucher invalid: {0}")]
    VoucherInvalid(String),

    /// The voucher covers less value than the delivered bytes require.
    #[error("voucher amount insufficient: got {got}, need {need}")]
    AmountInsufficient {
        /// Amount the voucher proves
        got: u64,
        /// Amount the delivered bytes require
        need: u64,
    },

    /// The named payment channel is unknown or not settled on chain.
    #[error("unknown payment channel: {0}")]
    UnknownChannel(String),

    /// Voucher redemption was rejected by the chain.
    #[error("voucher submission failed: {0}")]
    SubmitFailed(String),

    /// Transport-level failure talking to the wallet/chain client.
    #[error("chain RPC error: {0}")]
    Rpc(String),
}

impl ChainError {
    /// Create a voucher-invalid error.
    pub fn voucher_invalid(msg: impl Into<String>) -> Self {
        ChainError::VoucherInvalid(msg.into())
    }

    /// Create an RPC error.
    pub fn rpc(msg: impl Into<String>) -> Self {
        ChainError::Rpc(msg.into())
    }

    /// Returns true if this error is transient and the operation may succeed
    /// on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, ChainError::Rpc(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChainError::AmountInsufficient { got: 100, need: 500 };
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("500"));

        let err = ChainError::voucher_invalid("bad signature");
        assert!(err.to_string().contains("bad signature"));
    }

    #[test]
    fn test_is_transient() {
        assert!(ChainError::rpc("timeout").is_transient());
        assert!(!ChainError::voucher_invalid("forged").is_transient());
    }
}
