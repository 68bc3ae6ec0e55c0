//! Fixture constructors.

use payfetch_types::{Amount, DealProposal, PaymentVoucher, WalletAddr};
use serde_json::json;

/// The wallet address used by test providers.
pub fn test_wallet() -> WalletAddr {
    WalletAddr::new("f1test-provider")
}

/// Build a proposal addressed to [`test_wallet`].
pub fn proposal_for(
    size: u64,
    price_per_byte: Amount,
    payment_interval: u64,
    payment_interval_increase: u64,
) -> DealProposal {
    DealProposal {
        wallet: test_wallet(),
        size,
        price_per_byte,
        payment_interval,
        payment_interval_increase,
    }
}

/// Build a plausible-looking voucher with the given nonce and amount.
pub fn test_voucher(nonce: u64, amount: Amount) -> PaymentVoucher {
    PaymentVoucher::new(json!({
        "lane": 0,
        "nonce": nonce,
        "amount": amount.to_string(),
        "signature": format!("02sig{nonce:04}"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proposal_addresses_test_wallet() {
        let proposal = proposal_for(1000, 1, 500, 100);
        assert_eq!(proposal.wallet, test_wallet());
        assert_eq!(proposal.payment_interval, 500);
    }

    #[test]
    fn test_vouchers_differ_by_nonce() {
        assert_ne!(test_voucher(1, 100), test_voucher(2, 100));
    }
}
