//! The deal status enumeration.
//!
//! One enum serves as both the `status` field of protocol messages and the
//! lifecycle state of an ongoing deal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a retrieval deal, as carried in every protocol message.
///
/// The provider-side lifecycle is:
/// `AwaitingAcceptance` → `Accepted` → (`FundsNeeded` /
/// `FundsNeededLastPayment` cycles) → `Completed`.
///
/// `Unknown` absorbs any unrecognized wire value and drives the
/// protocol-violation path; it is never sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub enum DealStatus {
    /// New-deal request, awaiting provider acceptance
    AwaitingAcceptance,
    /// Provider accepted the proposed terms
    Accepted,
    /// Requester's payment channel is funded and ready
    PaymentChannelReady,
    /// Requester sent a payment voucher for the previous increment
    PaymentSent,
    /// Requester sent the final payment voucher
    LastPaymentSent,
    /// Provider released an increment and requires the next payment
    FundsNeeded,
    /// Provider released the final increment and requires the last payment
    FundsNeededLastPayment,
    /// All content delivered and paid for
    Completed,
    /// Any status value outside the enumerated set
    #[serde(other)]
    Unknown,
}

impl DealStatus {
    /// Check if this status ends the deal lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DealStatus::Completed)
    }
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DealStatus::AwaitingAcceptance => "awaitingAcceptance",
            DealStatus::Accepted => "accepted",
            DealStatus::PaymentChannelReady => "paymentChannelReady",
            DealStatus::PaymentSent => "paymentSent",
            DealStatus::LastPaymentSent => "lastPaymentSent",
            DealStatus::FundsNeeded => "fundsNeeded",
            DealStatus::FundsNeededLastPayment => "fundsNeededLastPayment",
            DealStatus::Completed => "completed",
            DealStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
