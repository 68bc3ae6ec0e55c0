//! Payment-channel capability for the payfetch provider.
//!
//! The provider gates content release on payment proof, but never interprets
//! vouchers itself; it hands them to a [`PaymentChain`] implementation backed
//! by the blockchain/wallet client. This crate defines the capability trait
//! with its fail-closed contract, plus an in-memory mock for tests.

pub mod error;
pub mod mock;
pub mod traits;

pub use error::{ChainError, ChainResult};
pub use mock::MockPaymentChain;
pub use traits::PaymentChain;
