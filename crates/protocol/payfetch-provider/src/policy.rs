//! Pricing and eligibility policy.
//!
//! Pure functions of the current [`ProviderConfig`]: quoting terms for a
//! content id, and validating a requester's proposal against the quote.
//! Both are re-evaluated against a fresh config snapshot on every new-deal
//! request, so pricing changes apply without restart.

use payfetch_types::{Cid, DealProposal, DealTerms, MIN_PAYMENT_INTERVAL, WILDCARD_CID};

use crate::config::ProviderConfig;
use crate::error::{ProviderError, ProviderResult};

/// Quote the provider's terms for a content id.
///
/// Returns `None` if the content is not knowingly hosted: it must have an
/// entry in `known_cids` AND a resolvable price (exact entry or wildcard).
pub fn quote(config: &ProviderConfig, cid: &Cid) -> Option<DealTerms> {
    let known = config.known_cids.get(cid)?;
    let price = config
        .prices_per_byte
        .get(cid.as_str())
        .or_else(|| config.prices_per_byte.get(WILDCARD_CID))?;

    Some(DealTerms::new(
        config.wallet.clone(),
        known.size,
        *price,
        config.payment_interval,
        config.payment_interval_increase,
    ))
}

/// Validate a requester's proposal against the provider's quote.
///
/// On success returns the deal's live terms: the offered price, interval and
/// increase (floored at [`MIN_PAYMENT_INTERVAL`]), with the provider's
/// authoritative content size.
pub fn validate_proposal(
    config: &ProviderConfig,
    cid: &Cid,
    proposal: &DealProposal,
) -> ProviderResult<DealTerms> {
    let quoted = quote(config, cid).ok_or_else(|| ProviderError::UnknownContent(cid.clone()))?;

    if proposal.wallet != quoted.wallet {
        return Err(ProviderError::WalletMismatch {
            offered: proposal.wallet.clone(),
            expected: quoted.wallet,
        });
    }
    if proposal.price_per_byte < quoted.price_per_byte {
        return Err(ProviderError::PriceBelowMinimum {
            offered: proposal.price_per_byte,
            required: quoted.price_per_byte,
        });
    }
    if proposal.payment_interval > quoted.payment_interval {
        return Err(ProviderError::IntervalAboveMaximum {
            offered: proposal.payment_interval,
            maximum: quoted.payment_interval,
        });
    }
    if proposal.payment_interval_increase > quoted.payment_interval_increase {
        return Err(ProviderError::IncreaseAboveMaximum {
            offered: proposal.payment_interval_increase,
            maximum: quoted.payment_interval_increase,
        });
    }

    let mut terms = DealTerms::from_proposal(proposal);
    terms.size = quoted.size;
    terms.payment_interval = terms.payment_interval.max(MIN_PAYMENT_INTERVAL);
    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use payfetch_types::WalletAddr;

    fn priced_cid() -> Cid {
        Cid::new("bafy-priced")
    }

    fn wildcard_cid() -> Cid {
        Cid::new("bafy-wildcard-only")
    }

    fn test_config() -> ProviderConfig {
        ProviderConfig::new(WalletAddr::new("f1provider"))
            .with_payment_interval(500)
            .with_payment_interval_increase(100)
            .with_price(&priced_cid(), 1000)
            .with_wildcard_price(500)
            .with_content(priced_cid(), 1000)
            .with_content(wildcard_cid(), 2000)
    }

    fn valid_proposal() -> DealProposal {
        DealProposal {
            wallet: WalletAddr::new("f1provider"),
            size: 1000,
            price_per_byte: 1000,
            payment_interval: 500,
            payment_interval_increase: 100,
        }
    }

    #[test]
    fn test_quote_exact_price() {
        let terms = quote(&test_config(), &priced_cid()).unwrap();
        assert_eq!(terms.price_per_byte, 1000);
        assert_eq!(terms.size, 1000);
        assert_eq!(terms.payment_interval, 500);
        assert_eq!(terms.payment_interval_increase, 100);
    }

    #[test]
    fn test_quote_falls_back_to_wildcard() {
        let terms = quote(&test_config(), &wildcard_cid()).unwrap();
        assert_eq!(terms.price_per_byte, 500);
        assert_eq!(terms.size, 2000);
    }

    #[test]
    fn test_quote_unknown_cid() {
        assert!(quote(&test_config(), &Cid::new("bafy-elsewhere")).is_none());
    }

    #[test]
    fn test_quote_known_cid_without_any_price() {
        let config = ProviderConfig::new(WalletAddr::new("f1provider"))
            .with_content(priced_cid(), 1000);
        // Hosted but unpriced content is not retrievable
        assert!(quote(&config, &priced_cid()).is_none());
    }

    #[test]
    fn test_accepts_valid_proposal() {
        let terms = validate_proposal(&test_config(), &priced_cid(), &valid_proposal()).unwrap();
        assert_eq!(terms.price_per_byte, 1000);
        assert_eq!(terms.payment_interval, 500);
        assert_eq!(terms.size, 1000);
    }

    #[test]
    fn test_accepts_better_than_quoted_price() {
        let proposal = DealProposal {
            price_per_byte: 1500,
            ..valid_proposal()
        };
        let terms = validate_proposal(&test_config(), &priced_cid(), &proposal).unwrap();
        // The offered price is the deal's live price
        assert_eq!(terms.price_per_byte, 1500);
    }

    #[test]
    fn test_rejects_unknown_content() {
        let result = validate_proposal(&test_config(), &Cid::new("bafy-nope"), &valid_proposal());
        assert!(matches!(result, Err(ProviderError::UnknownContent(_))));
    }

    #[test]
    fn test_rejects_wallet_mismatch() {
        let proposal = DealProposal {
            wallet: WalletAddr::new("f1somebody-else"),
            ..valid_proposal()
        };
        let result = validate_proposal(&test_config(), &priced_cid(), &proposal);
        assert!(matches!(result, Err(ProviderError::WalletMismatch { .. })));
    }

    #[test]
    fn test_rejects_price_below_wildcard() {
        // Content priced only via the 500 wildcard; an offer of 400 is short
        let proposal = DealProposal {
            price_per_byte: 400,
            size: 2000,
            ..valid_proposal()
        };
        let result = validate_proposal(&test_config(), &wildcard_cid(), &proposal);
        assert!(matches!(
            result,
            Err(ProviderError::PriceBelowMinimum {
                offered: 400,
                required: 500
            })
        ));
    }

    #[test]
    fn test_rejects_interval_above_maximum() {
        let proposal = DealProposal {
            payment_interval: 501,
            ..valid_proposal()
        };
        let result = validate_proposal(&test_config(), &priced_cid(), &proposal);
        assert!(matches!(
            result,
            Err(ProviderError::IntervalAboveMaximum {
                offered: 501,
                maximum: 500
            })
        ));
    }

    #[test]
    fn test_rejects_increase_above_maximum() {
        let proposal = DealProposal {
            payment_interval_increase: 101,
            ..valid_proposal()
        };
        let result = validate_proposal(&test_config(), &priced_cid(), &proposal);
        assert!(matches!(
            result,
            Err(ProviderError::IncreaseAboveMaximum {
                offered: 101,
                maximum: 100
            })
        ));
    }

    #[test]
    fn test_zero_interval_floored() {
        let proposal = DealProposal {
            payment_interval: 0,
            ..valid_proposal()
        };
        let terms = validate_proposal(&test_config(), &priced_cid(), &proposal).unwrap();
        assert_eq!(terms.payment_interval, MIN_PAYMENT_INTERVAL);
    }

    #[test]
    fn test_provider_size_is_authoritative() {
        let proposal = DealProposal {
            size: 999_999,
            ..valid_proposal()
        };
        let terms = validate_proposal(&test_config(), &priced_cid(), &proposal).unwrap();
        assert_eq!(terms.size, 1000);
    }
}
