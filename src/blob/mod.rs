//! Blob store access: listing the upload directory and removing files from it.

mod dir;

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub use dir::DirBlobStore;

/// One file physically present in the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobEntry {
    /// File name, compared verbatim against stored references
    pub name: String,
    pub size_bytes: u64,
    pub location: PathBuf,
}

impl BlobEntry {
    pub fn new(name: impl Into<String>, size_bytes: u64, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            location: location.into(),
        }
    }
}

/// Snapshot of the blob store taken at listing time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobListing {
    /// Entries in directory enumeration order
    pub entries: Vec<BlobEntry>,
    /// The root did not exist; treated as an empty store
    pub root_missing: bool,
    /// Entries that could not be represented as a file name (non UTF-8)
    pub skipped: usize,
}

impl BlobListing {
    pub fn new(entries: Vec<BlobEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    pub fn missing_root() -> Self {
        Self {
            root_missing: true,
            ..Self::default()
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size_bytes).sum()
    }
}

/// A flat store of named blobs.
pub trait BlobStore {
    /// Location shown to the operator.
    fn root(&self) -> &Path;

    /// Enumerate every blob currently present.
    fn list(&self) -> Result<BlobListing>;

    /// Remove one blob by name.
    fn delete(&self, name: &str) -> Result<()>;
}

impl<T: BlobStore + ?Sized> BlobStore for &T {
    fn root(&self) -> &Path {
        (**self).root()
    }

    fn list(&self) -> Result<BlobListing> {
        (**self).list()
    }

    fn delete(&self, name: &str) -> Result<()> {
        (**self).delete(name)
    }
}
