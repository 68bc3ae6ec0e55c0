//! Payment-chain trait definition.

use async_trait::async_trait;
use payfetch_types::{Amount, PaymentVoucher};

use crate::error::ChainResult;

/// Trait for payment-channel voucher operations.
///
/// This trait abstracts the blockchain/wallet client, allowing for:
/// - A real chain-backed implementation in production
/// - A mock implementation for testing
///
/// # Fail-closed contract
///
/// Implementations MUST error on any voucher they cannot positively
/// validate. Returning `Ok(())` from [`PaymentChain::verify_voucher`] is an
/// assertion that the voucher is genuine, covers at least
/// `expected_amount`, and has not been redeemed before. The provider
/// releases content on the strength of that assertion.
#[async_trait]
pub trait PaymentChain: Send + Sync {
    /// Verify a voucher received for a delivered increment.
    ///
    /// `expected_amount` is the price of the bytes the voucher pays for.
    async fn verify_voucher(
        &self,
        payment_channel: &str,
        voucher: &PaymentVoucher,
        expected_amount: Amount,
    ) -> ChainResult<()>;

    /// Redeem the final voucher of a completed deal on chain.
    async fn submit_voucher(
        &self,
        payment_channel: &str,
        voucher: &PaymentVoucher,
    ) -> ChainResult<()>;
}
