//! Data structures for the payfetch retrieval protocol.
//!
//! This crate provides the data types shared across the provider, the wire
//! protocol, and the storage/payment capabilities. It contains no business
//! logic, only type definitions with serialization support.
//!
//! # Module Organization
//!
//! - [`cid`] - Content identifiers
//! - [`constants`] - Protocol constants (limits, defaults, timing)
//! - [`deal`] - Deal identifiers, proposals and negotiated terms
//! - [`enums`] - The deal status enumeration
//! - [`voucher`] - Opaque payment-channel vouchers
//!
//! # Type Conventions
//!
//! - Derive `Debug`, `Clone`, `PartialEq`, `Eq` where appropriate
//! - Derive `Copy` for small types
//! - Derive `Serialize`, `Deserialize` for wire format
//! - Wire-facing structs use `#[serde(rename_all = "camelCase")]` to match
//!   the protocol's JSON field names

/// Crate version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cid;
pub mod constants;
pub mod deal;
pub mod enums;
pub mod voucher;

// Re-export all public types at the crate root for convenience

pub use cid::Cid;
pub use constants::*;
pub use deal::{DealId, DealProposal, DealTerms, WalletAddr};
pub use enums::DealStatus;
pub use voucher::PaymentVoucher;

/// Amount in atto-units (10^-18 of the native token).
///
/// This is the standard type for all monetary values in the protocol.
/// Prices are expressed in atto-units per byte.
pub type Amount = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_interop() {
        let cid = Cid::of(b"some content");
        let terms = DealTerms::new(
            WalletAddr::new("f1provider"),
            12,
            1000,
            DEFAULT_PAYMENT_INTERVAL,
            DEFAULT_PAYMENT_INTERVAL_INCREASE,
        );

        assert_eq!(terms.size, 12);
        assert!(!cid.as_str().is_empty());
        assert_eq!(terms.wallet.as_str(), "f1provider");
    }

    #[test]
    fn test_amount_type() {
        let price: Amount = 1000;
        let size: u64 = 1_000;
        assert_eq!(price.saturating_mul(size), 1_000_000);
    }

    #[test]
    fn test_constants_available() {
        assert_eq!(MAX_MESSAGE_SIZE, 10_485_760);
        assert_eq!(MIN_PAYMENT_INTERVAL, 1);
        assert_eq!(WILDCARD_CID, "*");
    }
}
