//! Mock implementation of the `PaymentChain` trait for testing.
//!
//! Tracks every verification and submission in memory and returns
//! configurable results.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use payfetch_types::{Amount, PaymentVoucher};
use tracing::debug;

use crate::error::{ChainError, ChainResult};
use crate::traits::PaymentChain;

struct MockPaymentChainInner {
    /// Record of all verified vouchers: (channel, voucher, expected amount).
    verified: Vec<(String, PaymentVoucher, Amount)>,
    /// Record of all submitted vouchers: (channel, voucher).
    submitted: Vec<(String, PaymentVoucher)>,
    /// When true, verify_voucher rejects everything.
    fail_verification: bool,
    /// When true, submit_voucher rejects everything.
    fail_submission: bool,
}

/// A mock implementation of the `PaymentChain` trait for testing.
///
/// Accepts every voucher by default; configure failures with
/// [`MockPaymentChain::with_failing_verification`] or the runtime setters.
/// Uses `Arc<RwLock<...>>` internally, so it is cheap to clone and all
/// clones share the same state.
///
/// The default accept-all mode exists for tests and local development only;
/// it does not satisfy the trait's fail-closed contract and must never back
/// a production provider.
#[derive(Clone)]
pub struct MockPaymentChain {
    inner: Arc<RwLock<MockPaymentChainInner>>,
}

impl Default for MockPaymentChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPaymentChain {
    /// Create a new accept-all mock.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MockPaymentChainInner {
                verified: Vec::new(),
                submitted: Vec::new(),
                fail_verification: false,
                fail_submission: false,
            })),
        }
    }

    /// Configure the mock to reject all voucher verifications.
    pub fn with_failing_verification(self) -> Self {
        self.inner.write().unwrap().fail_verification = true;
        self
    }

    /// Configure the mock to reject all voucher submissions.
    pub fn with_failing_submission(self) -> Self {
        self.inner.write().unwrap().fail_submission = true;
        self
    }

    /// Set the verification failure mode at runtime.
    pub fn set_fail_verification(&self, fail: bool) {
        self.inner.write().unwrap().fail_verification = fail;
    }

    // =========================================================================
    // Assertion Helpers
    // =========================================================================

    /// Number of vouchers verified so far.
    pub fn verified_count(&self) -> usize {
        self.inner.read().unwrap().verified.len()
    }

    /// All verified vouchers: (channel, voucher, expected amount).
    pub fn verified(&self) -> Vec<(String, PaymentVoucher, Amount)> {
        self.inner.read().unwrap().verified.clone()
    }

    /// All submitted vouchers: (channel, voucher).
    pub fn submitted(&self) -> Vec<(String, PaymentVoucher)> {
        self.inner.read().unwrap().submitted.clone()
    }
}

#[async_trait]
impl PaymentChain for MockPaymentChain {
    async fn verify_voucher(
        &self,
        payment_channel: &str,
        voucher: &PaymentVoucher,
        expected_amount: Amount,
    ) -> ChainResult<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.fail_verification {
            return Err(ChainError::voucher_invalid("mock verification failure"));
        }
        debug!(
            channel = payment_channel,
            expected_amount, "mock voucher verified"
        );
        inner
            .verified
            .push((payment_channel.to_string(), voucher.clone(), expected_amount));
        Ok(())
    }

    async fn submit_voucher(
        &self,
        payment_channel: &str,
        voucher: &PaymentVoucher,
    ) -> ChainResult<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.fail_submission {
            return Err(ChainError::SubmitFailed(
                "mock submission failure".to_string(),
            ));
        }
        debug!(channel = payment_channel, "mock voucher submitted");
        inner
            .submitted
            .push((payment_channel.to_string(), voucher.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_voucher(nonce: u64) -> PaymentVoucher {
        PaymentVoucher::new(json!({ "nonce": nonce, "amount": "500000" }))
    }

    #[tokio::test]
    async fn test_mock_records_verifications() {
        let chain = MockPaymentChain::new();

        chain
            .verify_voucher("f2chan", &test_voucher(1), 500)
            .await
            .unwrap();
        chain
            .verify_voucher("f2chan", &test_voucher(2), 600)
            .await
            .unwrap();

        assert_eq!(chain.verified_count(), 2);
        let verified = chain.verified();
        assert_eq!(verified[0].2, 500);
        assert_eq!(verified[1].2, 600);
    }

    #[tokio::test]
    async fn test_mock_records_submissions() {
        let chain = MockPaymentChain::new();

        chain
            .submit_voucher("f2chan", &test_voucher(9))
            .await
            .unwrap();

        let submitted = chain.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].0, "f2chan");
    }

    #[tokio::test]
    async fn test_failing_verification() {
        let chain = MockPaymentChain::new().with_failing_verification();

        let result = chain.verify_voucher("f2chan", &test_voucher(1), 500).await;
        assert!(matches!(result, Err(ChainError::VoucherInvalid(_))));
        assert_eq!(chain.verified_count(), 0);
    }

    #[tokio::test]
    async fn test_failing_submission() {
        let chain = MockPaymentChain::new().with_failing_submission();

        let result = chain.submit_voucher("f2chan", &test_voucher(1)).await;
        assert!(matches!(result, Err(ChainError::SubmitFailed(_))));
    }

    #[tokio::test]
    async fn test_runtime_failure_toggle() {
        let chain = MockPaymentChain::new();
        chain.set_fail_verification(true);
        assert!(chain
            .verify_voucher("f2chan", &test_voucher(1), 100)
            .await
            .is_err());

        chain.set_fail_verification(false);
        assert!(chain
            .verify_voucher("f2chan", &test_voucher(2), 100)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let chain = MockPaymentChain::new();
        let clone = chain.clone();

        chain
            .verify_voucher("f2chan", &test_voucher(1), 100)
            .await
            .unwrap();
        assert_eq!(clone.verified_count(), 1);
    }
}
