//! Provider configuration and live reload.
//!
//! A [`ProviderConfig`] is the full pricing/eligibility surface: the
//! provider's wallet, its interval limits, the per-cid (or wildcard) price
//! table, and the table of hosted content. The provider reads it through a
//! [`ConfigHandle`], which supports atomic replacement when the operator's
//! options change; a reload that fails to resolve keeps the previous valid
//! settings in effect.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use payfetch_types::{
    Amount, Cid, WalletAddr, DEFAULT_PAYMENT_INTERVAL, DEFAULT_PAYMENT_INTERVAL_INCREASE,
    WILDCARD_CID,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Metadata the provider keeps for each hosted content id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownContent {
    /// Total content size in bytes
    pub size: u64,
}

/// The provider's full configuration surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Wallet requesters must address their payments to
    pub wallet: WalletAddr,

    /// Maximum payment interval the provider accepts, in bytes
    #[serde(default = "default_interval")]
    pub payment_interval: u64,

    /// Maximum per-cycle interval increase the provider accepts, in bytes
    #[serde(default = "default_increase")]
    pub payment_interval_increase: u64,

    /// Price table: content id (or `"*"`) → atto per byte
    #[serde(default)]
    pub prices_per_byte: HashMap<String, Amount>,

    /// Hosted content table: content id → metadata
    #[serde(default)]
    pub known_cids: HashMap<Cid, KnownContent>,
}

fn default_interval() -> u64 {
    DEFAULT_PAYMENT_INTERVAL
}

fn default_increase() -> u64 {
    DEFAULT_PAYMENT_INTERVAL_INCREASE
}

impl ProviderConfig {
    /// Create a configuration with default interval limits and empty tables.
    pub fn new(wallet: WalletAddr) -> Self {
        Self {
            wallet,
            payment_interval: DEFAULT_PAYMENT_INTERVAL,
            payment_interval_increase: DEFAULT_PAYMENT_INTERVAL_INCREASE,
            prices_per_byte: HashMap::new(),
            known_cids: HashMap::new(),
        }
    }

    /// Set the maximum acceptable payment interval.
    pub fn with_payment_interval(mut self, interval: u64) -> Self {
        self.payment_interval = interval;
        self
    }

    /// Set the maximum acceptable interval increase.
    pub fn with_payment_interval_increase(mut self, increase: u64) -> Self {
        self.payment_interval_increase = increase;
        self
    }

    /// Price one content id.
    pub fn with_price(mut self, cid: &Cid, price_per_byte: Amount) -> Self {
        self.prices_per_byte
            .insert(cid.as_str().to_string(), price_per_byte);
        self
    }

    /// Set the wildcard price applying to any hosted content id.
    pub fn with_wildcard_price(mut self, price_per_byte: Amount) -> Self {
        self.prices_per_byte
            .insert(WILDCARD_CID.to_string(), price_per_byte);
        self
    }

    /// Register hosted content.
    pub fn with_content(mut self, cid: Cid, size: u64) -> Self {
        self.known_cids.insert(cid, KnownContent { size });
        self
    }
}

/// Shared, reloadable view of the provider configuration.
///
/// Cheap to clone; all clones observe the same settings.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<ProviderConfig>>,
}

impl ConfigHandle {
    /// Wrap an initial configuration.
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Snapshot the current configuration.
    pub fn current(&self) -> ProviderConfig {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Apply a re-resolved configuration.
    ///
    /// A resolution failure is logged and the previous valid settings remain
    /// in effect; the provider never crashes on a malformed options change.
    pub fn reload<E: std::fmt::Display>(&self, resolved: Result<ProviderConfig, E>) {
        match resolved {
            Ok(config) => {
                let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
                info!(
                    payment_interval = config.payment_interval,
                    payment_interval_increase = config.payment_interval_increase,
                    priced_cids = config.prices_per_byte.len(),
                    known_cids = config.known_cids.len(),
                    "provider configuration reloaded"
                );
                *guard = config;
            }
            Err(e) => {
                warn!(error = %e, "configuration reload failed, keeping previous settings");
            }
        }
    }
}
