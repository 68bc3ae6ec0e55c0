//! Opaque payment-channel vouchers.
//!
//! The provider core never interprets voucher contents; it passes them
//! through to the payment-chain capability for verification and redemption.

use serde::{Deserialize, Serialize};

/// An off-chain payment-channel voucher proving incremental payment.
///
/// Structurally opaque: the wallet client that issued it is the only party
/// that understands its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentVoucher(pub serde_json::Value);

impl PaymentVoucher {
    /// Wrap a raw voucher value.
    pub fn new(raw: serde_json::Value) -> Self {
        PaymentVoucher(raw)
    }

    /// The raw voucher value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.0
    }
}
