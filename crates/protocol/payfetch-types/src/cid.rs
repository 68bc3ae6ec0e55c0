//! Content identifiers.
//!
//! A [`Cid`] names one piece of hosted content. On the wire and in
//! configuration it is an opaque string; locally produced ids are the
//! base58-encoded SHA-256 of the content bytes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// An opaque content identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cid(String);

impl Cid {
    /// Wrap an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Cid(id.into())
    }

    /// Compute the identifier of the given content bytes.
    ///
    /// `base58(SHA-256(content))`
    pub fn of(content: &[u8]) -> Self {
        let digest = Sha256::digest(content);
        Cid(bs58::encode(digest).into_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cid {
    fn from(s: &str) -> Self {
        Cid(s.to_string())
    }
}
