//! Provider-side engine for the payfetch retrieval protocol.
//!
//! This crate implements the full lifecycle of provider-side retrieval
//! deals: a requester proposes terms for hosted content, the provider
//! validates them against its pricing policy, then streams the content in
//! payment-interval-sized increments, requiring a payment-channel voucher
//! before each further increment.
//!
//! # Module Organization
//!
//! - [`config`] - Provider configuration and live reload
//! - [`policy`] - Pricing and proposal validation (pure functions)
//! - [`deal`] - Deals and the ongoing-deals table
//! - [`delivery`] - Metered content delivery
//! - [`sink`] - Outbound message queue with explicit close
//! - [`events`] - Fire-and-forget observability events
//! - [`provider`] - The [`DealProvider`] state machine
//! - [`dispatch`] - Per-connection read/write loops
//! - [`error`] - Provider error types
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use payfetch_chain::MockPaymentChain;
//! use payfetch_provider::{DealProvider, ProviderConfig};
//! use payfetch_store::MemoryContentStore;
//! use payfetch_types::WalletAddr;
//!
//! # async fn serve(socket: tokio::net::TcpStream) {
//! let store = MemoryContentStore::new();
//! let cid = store.insert(b"hosted document");
//!
//! let config = ProviderConfig::new(WalletAddr::new("f1provider"))
//!     .with_wildcard_price(2)
//!     .with_content(cid, 15);
//!
//! let provider = Arc::new(DealProvider::new(
//!     config,
//!     Arc::new(store),
//!     Arc::new(MockPaymentChain::new()),
//! ));
//!
//! let (reader, writer) = socket.into_split();
//! payfetch_provider::run_connection(provider, reader, writer).await;
//! # }
//! ```
//!
//! # Concurrency Model
//!
//! One cooperative task per connection; messages on a connection are handled
//! strictly in arrival order, one at a time. Connections are concurrent
//! relative to each other with no cross-connection ordering. The deal table
//! is keyed by `(connection, deal id)`, so deal ids never collide across
//! connections.
//!
//! # Failure Policy
//!
//! Fail-fast per connection: any policy rejection, protocol violation, or
//! unexpected failure while handling a message terminates that connection's
//! pipe and drops its deals. Partial effects are retained (no rollback), and
//! no other connection is affected.

pub mod config;
pub mod deal;
pub mod delivery;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod policy;
pub mod provider;
pub mod sink;

// Re-export main types at crate root

pub use config::{ConfigHandle, KnownContent, ProviderConfig};
pub use deal::{ConnectionId, Deal, DealKey, DealSnapshot, OngoingDeals};
pub use dispatch::run_connection;
pub use error::{ProviderError, ProviderResult};
pub use events::{EventSink, ProviderEvent};
pub use policy::{quote, validate_proposal};
pub use provider::DealProvider;
pub use sink::{MessageSink, SinkDrain};
