//! Filesystem content store.
//!
//! One file per content id, named by the id, under a single root directory.
//! Fetches are lazy: the file is opened and seeked once, then chunks are read
//! on demand as the delivery loop pulls them.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use payfetch_types::{Cid, DEFAULT_CHUNK_SIZE};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::traits::{BlockIter, ContentStore};

/// A [`ContentStore`] backed by a directory of files.
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
    chunk_size: usize,
}

impl FsContentStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_chunk_size(root, DEFAULT_CHUNK_SIZE)
    }

    /// Open a store with a custom chunk size.
    pub fn open_with_chunk_size(root: impl Into<PathBuf>, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(StoreError::InvalidChunkSize(chunk_size));
        }
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root, chunk_size })
    }

    /// Store content, computing and returning its id.
    pub fn insert(&self, content: &[u8]) -> Result<Cid> {
        let cid = Cid::of(content);
        let path = self.path_of(&cid);
        if !path.exists() {
            std::fs::write(&path, content)?;
            debug!(cid = %cid, bytes = content.len(), "stored content file");
        }
        Ok(cid)
    }

    fn path_of(&self, cid: &Cid) -> PathBuf {
        self.root.join(cid.as_str())
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentStore for FsContentStore {
    fn fetch(&self, cid: &Cid, offset: u64) -> Result<BlockIter> {
        let path = self.path_of(cid);
        if !path.exists() {
            return Err(StoreError::ContentNotFound(cid.clone()));
        }

        let file = File::open(&path)?;
        let len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let start = offset.min(len);
        reader.seek(SeekFrom::Start(start))?;

        Ok(Box::new(FileChunks {
            reader,
            remaining: len - start,
            chunk_size: self.chunk_size,
        }))
    }

    fn contains(&self, cid: &Cid) -> bool {
        self.path_of(cid).exists()
    }

    fn size(&self, cid: &Cid) -> Result<Option<u64>> {
        let path = self.path_of(cid);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::metadata(&path)?.len()))
    }
}

struct FileChunks {
    reader: BufReader<File>,
    remaining: u64,
    chunk_size: usize,
}

impl Iterator for FileChunks {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let want = (self.chunk_size as u64).min(self.remaining) as usize;
        let mut chunk = vec![0u8; want];
        match self.reader.read_exact(&mut chunk) {
            Ok(()) => {
                self.remaining -= want as u64;
                Some(Ok(chunk))
            }
            Err(e) => {
                // Stop after surfacing the error once
                self.remaining = 0;
                Some(Err(StoreError::Io(e)))
            }
        }
    }
}
