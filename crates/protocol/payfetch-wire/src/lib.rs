//! Wire protocol for the payfetch retrieval exchange.
//!
//! Messages are single JSON objects, one per line (newline-delimited JSON),
//! exchanged over one bidirectional byte stream per connection. Every message
//! carries a `dealId` and a `status`; the remaining fields depend on the
//! status.
//!
//! - [`message`] - The [`DealMessage`] envelope and its constructors
//! - [`codec`] - Framed async reading/writing with size limits
//! - [`error`] - Encode/decode error types

pub mod codec;
pub mod error;
pub mod message;

pub use codec::{MessageReader, MessageWriter};
pub use error::{DecodeError, EncodeError};
pub use message::{decode_message, encode_message, Block, DealMessage};
