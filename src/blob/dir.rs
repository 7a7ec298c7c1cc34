//! Directory-backed blob store.

use log::{debug, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{BlobEntry, BlobListing, BlobStore};
use crate::error::{ReapError, Result};

/// Blob store over a single flat directory. Subdirectories are not descended.
#[derive(Debug, Clone)]
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a blob name to its path, refusing anything that could leave the root.
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let escapes = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
            || name.contains('\0');
        if escapes {
            return Err(ReapError::InvalidBlobName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

impl BlobStore for DirBlobStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self) -> Result<BlobListing> {
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Blob store root {} does not exist, treating as empty", self.root.display());
                return Ok(BlobListing::missing_root());
            }
            Err(e) => {
                return Err(ReapError::BlobStore(format!(
                    "Failed to read {}: {}",
                    self.root.display(),
                    e
                )));
            }
        };

        let mut listing = BlobListing::default();
        for entry in dir {
            let entry = entry
                .map_err(|e| ReapError::BlobStore(format!("Failed to read {}: {}", self.root.display(), e)))?;
            let path = entry.path();

            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("{} vanished during listing", path.display());
                    continue;
                }
                Err(e) => {
                    return Err(ReapError::BlobStore(format!("Failed to stat {}: {}", path.display(), e)));
                }
            };

            if !metadata.is_file() {
                debug!("Skipping non-file entry {}", path.display());
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) => listing.entries.push(BlobEntry::new(name, metadata.len(), path)),
                Err(raw) => {
                    warn!("Skipping non UTF-8 file name {:?}", raw);
                    listing.skipped += 1;
                }
            }
        }

        info!(
            "Found {} files ({} bytes) in {}",
            listing.entries.len(),
            listing.total_bytes(),
            self.root.display()
        );
        Ok(listing)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.resolve(name)?;
        fs::remove_file(&path)?;
        debug!("Deleted {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populated_store() -> (DirBlobStore, TempDir) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.jpg"), vec![0u8; 100]).unwrap();
        fs::write(dir.path().join("b.png"), vec![0u8; 200]).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.pdf"), vec![0u8; 300]).unwrap();
        (DirBlobStore::new(dir.path()), dir)
    }

    #[test]
    fn test_list_flat_files_with_sizes() {
        let (store, _dir) = populated_store();

        let listing = store.list().unwrap();
        let mut entries = listing.entries.clone();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.jpg");
        assert_eq!(entries[0].size_bytes, 100);
        assert_eq!(entries[1].name, "b.png");
        assert_eq!(entries[1].size_bytes, 200);
        assert_eq!(listing.total_bytes(), 300);
    }

    #[test]
    fn test_list_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = DirBlobStore::new(dir.path().join("does-not-exist"));

        let listing = store.list().unwrap();
        assert!(listing.root_missing);
        assert!(listing.entries.is_empty());
    }

    #[test]
    fn test_list_root_is_a_file_fails() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("uploads");
        fs::write(&file, "not a dir").unwrap();

        let err = DirBlobStore::new(&file).list().unwrap_err();
        assert!(matches!(err, ReapError::BlobStore(_)));
    }

    #[test]
    fn test_delete_removes_file() {
        let (store, dir) = populated_store();
        store.delete("a.jpg").unwrap();
        assert!(!dir.path().join("a.jpg").exists());
        assert!(dir.path().join("b.png").exists());
    }

    #[test]
    fn test_delete_missing_file_fails() {
        let (store, _dir) = populated_store();
        assert!(matches!(store.delete("gone.jpg"), Err(ReapError::Io(_))));
    }

    #[test]
    fn test_delete_refuses_path_escapes() {
        let (store, dir) = populated_store();
        for name in ["", ".", "..", "../a.jpg", "nested/c.pdf", "nested\\c.pdf"] {
            assert!(
                matches!(store.delete(name), Err(ReapError::InvalidBlobName(_))),
                "expected {:?} to be refused",
                name
            );
        }
        assert!(dir.path().join("nested").join("c.pdf").exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_list_counts_non_utf8_names_as_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (store, dir) = populated_store();
        fs::write(dir.path().join(OsStr::from_bytes(b"bad\xff.jpg")), b"x").unwrap();

        let listing = store.list().unwrap();
        assert_eq!(listing.skipped, 1);
        assert_eq!(listing.entries.len(), 2);
    }
}
