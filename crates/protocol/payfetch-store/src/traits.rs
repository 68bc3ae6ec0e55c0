//! Trait definition for the content storage capability.

use payfetch_types::Cid;

use crate::error::Result;

/// A lazy sequence of content chunks.
///
/// Chunks are yielded in content order; every yielded chunk is non-empty.
pub type BlockIter = Box<dyn Iterator<Item = Result<Vec<u8>>> + Send>;

/// Trait for fetching hosted content as chunked byte ranges.
pub trait ContentStore: Send + Sync {
    /// Fetch content starting at `offset`, as a lazy chunk iterator.
    ///
    /// An offset at or past the end of the content yields an empty iterator.
    /// Returns `StoreError::ContentNotFound` if the id is not hosted.
    fn fetch(&self, cid: &Cid, offset: u64) -> Result<BlockIter>;

    /// Check whether the content id is hosted.
    fn contains(&self, cid: &Cid) -> bool;

    /// Get the total content size without reading it.
    ///
    /// Returns `None` if the content is not hosted.
    fn size(&self, cid: &Cid) -> Result<Option<u64>>;
}
