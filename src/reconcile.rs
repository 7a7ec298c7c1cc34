//! Diff of the blob listing against the live reference set.

use serde::Serialize;

use crate::blob::{BlobEntry, BlobListing};
use crate::reference::LiveReferenceSet;

/// Outcome of one reconciliation pass. Built once per run, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Distinct names referenced by the database
    pub total_referenced: usize,
    /// Files present in the blob store
    pub total_on_disk: usize,
    /// Files present and referenced
    pub referenced_on_disk: usize,
    pub total_orphaned: usize,
    pub orphaned_bytes: u64,
    /// Unreferenced files, in listing order
    pub orphans: Vec<BlobEntry>,
    pub root_missing: bool,
    /// Files left out of the listing because their names are not UTF-8
    pub skipped_entries: usize,
}

impl CleanupReport {
    pub fn has_orphans(&self) -> bool {
        !self.orphans.is_empty()
    }
}

/// Split the listing into referenced and orphaned entries.
///
/// Pure function of its inputs. `total_on_disk == total_orphaned + referenced_on_disk`
/// holds for every result.
pub fn reconcile(live: &LiveReferenceSet, listing: BlobListing) -> CleanupReport {
    let total_on_disk = listing.entries.len();

    let (referenced, orphans): (Vec<BlobEntry>, Vec<BlobEntry>) = listing
        .entries
        .into_iter()
        .partition(|entry| live.contains(&entry.name));

    CleanupReport {
        total_referenced: live.len(),
        total_on_disk,
        referenced_on_disk: referenced.len(),
        total_orphaned: orphans.len(),
        orphaned_bytes: orphans.iter().map(|e| e.size_bytes).sum(),
        orphans,
        root_missing: listing.root_missing,
        skipped_entries: listing.skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(files: &[(&str, u64)]) -> BlobListing {
        BlobListing::new(
            files
                .iter()
                .map(|(name, size)| BlobEntry::new(*name, *size, format!("/uploads/{}", name)))
                .collect(),
        )
    }

    #[test]
    fn test_orphan_scenario() {
        let live: LiveReferenceSet = ["a.jpg", "b.png"].into_iter().collect();
        let report = reconcile(&live, listing(&[("a.jpg", 100), ("b.png", 200), ("c.pdf", 300)]));

        assert_eq!(report.total_referenced, 2);
        assert_eq!(report.total_on_disk, 3);
        assert_eq!(report.referenced_on_disk, 2);
        assert_eq!(report.total_orphaned, 1);
        assert_eq!(report.orphaned_bytes, 300);
        assert_eq!(report.orphans[0].name, "c.pdf");
    }

    #[test]
    fn test_empty_reference_set_orphans_everything() {
        let report = reconcile(&LiveReferenceSet::new(), listing(&[("a.jpg", 1), ("b.png", 2)]));
        assert_eq!(report.total_orphaned, 2);
        assert_eq!(report.orphaned_bytes, 3);
    }

    #[test]
    fn test_empty_listing_has_no_orphans() {
        let live: LiveReferenceSet = ["a.jpg", "b.png", "c.pdf"].into_iter().collect();
        let report = reconcile(&live, BlobListing::default());

        assert_eq!(report.total_referenced, 3);
        assert_eq!(report.total_orphaned, 0);
        assert_eq!(report.orphaned_bytes, 0);
        assert!(!report.has_orphans());
    }

    #[test]
    fn test_preserves_listing_order() {
        let report = reconcile(
            &LiveReferenceSet::new(),
            listing(&[("z.jpg", 1), ("a.jpg", 1), ("m.jpg", 1)]),
        );
        let names: Vec<&str> = report.orphans.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["z.jpg", "a.jpg", "m.jpg"]);
    }

    #[test]
    fn test_on_disk_count_invariant() {
        let live: LiveReferenceSet = ["a", "c", "e", "x"].into_iter().collect();
        let report = reconcile(
            &live,
            listing(&[("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5)]),
        );
        assert_eq!(report.total_on_disk, report.total_orphaned + report.referenced_on_disk);
        assert_eq!(report.referenced_on_disk, 3);
    }

    #[test]
    fn test_carries_skipped_count() {
        let mut skipped = listing(&[("a.jpg", 1)]);
        skipped.skipped = 2;

        let report = reconcile(&LiveReferenceSet::new(), skipped);
        assert_eq!(report.skipped_entries, 2);
        assert_eq!(report.total_on_disk, 1);
    }

    #[test]
    fn test_carries_missing_root_flag() {
        let report = reconcile(&LiveReferenceSet::new(), BlobListing::missing_root());
        assert!(report.root_missing);
        assert_eq!(report.total_on_disk, 0);
    }
}
