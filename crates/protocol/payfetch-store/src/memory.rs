//! In-memory content store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use payfetch_types::{Cid, DEFAULT_CHUNK_SIZE};

use crate::error::{Result, StoreError};
use crate::traits::{BlockIter, ContentStore};

/// An in-memory [`ContentStore`].
///
/// Content is held in shared buffers; fetch iterators clone out one chunk at
/// a time. Cheap to clone, all clones share the same content map.
#[derive(Clone)]
pub struct MemoryContentStore {
    objects: Arc<RwLock<HashMap<Cid, Arc<Vec<u8>>>>>,
    chunk_size: usize,
}

impl MemoryContentStore {
    /// Create an empty store with the default chunk size.
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Create an empty store with a custom chunk size.
    pub fn with_chunk_size(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(StoreError::InvalidChunkSize(chunk_size));
        }
        Ok(Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            chunk_size,
        })
    }

    /// Store content, computing and returning its id.
    pub fn insert(&self, content: &[u8]) -> Cid {
        let cid = Cid::of(content);
        self.insert_with_cid(cid.clone(), content);
        cid
    }

    /// Store content under an externally-assigned id.
    pub fn insert_with_cid(&self, cid: Cid, content: &[u8]) {
        self.objects
            .write()
            .expect("content map lock poisoned")
            .insert(cid, Arc::new(content.to_vec()));
    }
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for MemoryContentStore {
    fn fetch(&self, cid: &Cid, offset: u64) -> Result<BlockIter> {
        let content = self
            .objects
            .read()
            .expect("content map lock poisoned")
            .get(cid)
            .cloned()
            .ok_or_else(|| StoreError::ContentNotFound(cid.clone()))?;

        let chunk_size = self.chunk_size;
        let start = (offset.min(content.len() as u64)) as usize;
        let iter = ChunkIter {
            content,
            pos: start,
            chunk_size,
        };
        Ok(Box::new(iter))
    }

    fn contains(&self, cid: &Cid) -> bool {
        self.objects
            .read()
            .expect("content map lock poisoned")
            .contains_key(cid)
    }

    fn size(&self, cid: &Cid) -> Result<Option<u64>> {
        Ok(self
            .objects
            .read()
            .expect("content map lock poisoned")
            .get(cid)
            .map(|c| c.len() as u64))
    }
}

struct ChunkIter {
    content: Arc<Vec<u8>>,
    pos: usize,
    chunk_size: usize,
}

impl Iterator for ChunkIter {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.content.len() {
            return None;
        }
        let end = (self.pos + self.chunk_size).min(self.content.len());
        let chunk = self.content[self.pos..end].to_vec();
        self.pos = end;
        Some(Ok(chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(iter: BlockIter) -> Vec<Vec<u8>> {
        iter.map(|chunk| chunk.unwrap()).collect()
    }

    #[test]
    fn test_insert_and_fetch() {
        let store = MemoryContentStore::with_chunk_size(4).unwrap();
        let cid = store.insert(b"hello world");

        assert!(store.contains(&cid));
        assert_eq!(store.size(&cid).unwrap(), Some(11));

        let chunks = collect(store.fetch(&cid, 0).unwrap());
        assert_eq!(chunks, vec![b"hell".to_vec(), b"o wo".to_vec(), b"rld".to_vec()]);
    }

    #[test]
    fn test_fetch_from_offset() {
        let store = MemoryContentStore::with_chunk_size(4).unwrap();
        let cid = store.insert(b"hello world");

        let chunks = collect(store.fetch(&cid, 6).unwrap());
        let rest: Vec<u8> = chunks.concat();
        assert_eq!(rest, b"world");
    }

    #[test]
    fn test_fetch_past_end_is_empty() {
        let store = MemoryContentStore::new();
        let cid = store.insert(b"tiny");

        let chunks = collect(store.fetch(&cid, 100).unwrap());
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_fetch_unknown_cid() {
        let store = MemoryContentStore::new();
        let result = store.fetch(&Cid::new("bafy-missing"), 0);
        assert!(matches!(result, Err(StoreError::ContentNotFound(_))));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(matches!(
            MemoryContentStore::with_chunk_size(0),
            Err(StoreError::InvalidChunkSize(0))
        ));
    }

    #[test]
    fn test_chunks_are_nonempty() {
        let store = MemoryContentStore::with_chunk_size(5).unwrap();
        let cid = store.insert(&[7u8; 13]);

        for chunk in store.fetch(&cid, 0).unwrap() {
            assert!(!chunk.unwrap().is_empty());
        }
    }

    #[test]
    fn test_clones_share_content() {
        let store = MemoryContentStore::new();
        let clone = store.clone();
        let cid = store.insert(b"shared");
        assert!(clone.contains(&cid));
    }
}
