//! Content storage capability for the payfetch provider.
//!
//! The provider consumes storage through the [`ContentStore`] trait: given a
//! content id and a byte offset, storage returns a lazy sequence of chunks.
//! Two implementations are provided:
//!
//! - [`MemoryContentStore`] - in-memory, for tests and seeded daemons
//! - [`FsContentStore`] - one file per content id under a root directory
//!
//! # Trait-Based Design
//!
//! Storage is a capability, not a database: the provider never enumerates
//! content, it only pulls chunks for deals it has already priced from
//! configuration.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use fs::FsContentStore;
pub use memory::MemoryContentStore;
pub use traits::{BlockIter, ContentStore};
