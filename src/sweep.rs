//! Deletion pass over the orphan set.
//!
//! Each deletion is isolated. A failure is recorded and the pass moves on to
//! the next entry; nothing is retried.

use log::{info, warn};
use serde::Serialize;

use crate::blob::{BlobEntry, BlobStore};

/// A deletion that did not happen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepFailure {
    pub entry: BlobEntry,
    pub reason: String,
}

/// Tally of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepOutcome {
    pub deleted: Vec<BlobEntry>,
    pub deleted_bytes: u64,
    pub failures: Vec<SweepFailure>,
    pub orphaned_count: usize,
    pub orphaned_bytes: u64,
}

impl SweepOutcome {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    /// True when every orphan was removed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Delete every orphan from the store.
pub fn sweep<S: BlobStore + ?Sized>(store: &S, orphans: &[BlobEntry]) -> SweepOutcome {
    let mut outcome = SweepOutcome {
        orphaned_count: orphans.len(),
        orphaned_bytes: orphans.iter().map(|e| e.size_bytes).sum(),
        ..SweepOutcome::default()
    };

    for entry in orphans {
        match store.delete(&entry.name) {
            Ok(()) => {
                info!("Deleted orphan {} ({} bytes)", entry.name, entry.size_bytes);
                outcome.deleted_bytes += entry.size_bytes;
                outcome.deleted.push(entry.clone());
            }
            Err(e) => {
                warn!("Failed to delete {}: {}", entry.name, e);
                outcome.failures.push(SweepFailure {
                    entry: entry.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Sweep finished: {} of {} deleted, {} failed",
        outcome.deleted_count(),
        outcome.orphaned_count,
        outcome.failures.len()
    );
    outcome
}
