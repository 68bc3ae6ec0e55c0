//! Protocol constants.
//!
//! These constants define protocol-level limits, delivery defaults and
//! timing parameters for the provider.

// =============================================================================
// Message Limits
// =============================================================================

/// Maximum encoded message size: 10 MB
pub const MAX_MESSAGE_SIZE: u64 = 10_485_760;

// =============================================================================
// Delivery
// =============================================================================

/// Floor applied to a deal's payment interval during delivery.
///
/// A degenerate interval of zero would satisfy its threshold with zero bytes
/// and the deal would never make progress; flooring at one byte guarantees at
/// least one block is released per payment cycle.
pub const MIN_PAYMENT_INTERVAL: u64 = 1;

/// Default payment interval offered to requesters: 1 MiB
pub const DEFAULT_PAYMENT_INTERVAL: u64 = 1_048_576;

/// Default per-cycle payment interval increase: 256 KiB
pub const DEFAULT_PAYMENT_INTERVAL_INCREASE: u64 = 262_144;

/// Default storage chunk size: 256 KiB
pub const DEFAULT_CHUNK_SIZE: usize = 262_144;

// =============================================================================
// Pricing
// =============================================================================

/// Wildcard key in the price table, matching any hosted content id.
pub const WILDCARD_CID: &str = "*";

// =============================================================================
// Timing
// =============================================================================

/// Idle deal expiry: 10 minutes (in milliseconds)
pub const DEAL_IDLE_TIMEOUT_MS: u64 = 600_000;

/// Interval between ongoing-deals snapshots: 30 seconds (in milliseconds)
pub const DEALS_SNAPSHOT_INTERVAL_MS: u64 = 30_000;
