//! One cleanup run: collect references, list blobs, reconcile, report, and
//! optionally sweep.
//!
//! The run holds no lock on the database or the upload directory. A row that
//! starts referencing a file after references were collected does not protect
//! that file from the sweep. Runs are meant for quiet maintenance windows.

use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;
use std::io::Write;

use crate::blob::BlobStore;
use crate::error::Result;
use crate::reconcile::{CleanupReport, reconcile};
use crate::reference::{ReferenceSource, collect_references};
use crate::registry::Registry;
use crate::report::{ReportFormat, render_json, render_report, render_sweep};
use crate::sweep::{SweepOutcome, sweep};

/// Whether orphans are only reported or also removed.
///
/// Deletion is never the default; it has to be requested explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    #[default]
    DryRun,
    Delete,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::DryRun => write!(f, "dry-run"),
            RunMode::Delete => write!(f, "delete"),
        }
    }
}

/// Stages of a run, in order. None is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    CollectingReferences,
    ListingBlobs,
    Reconciling,
    Reporting,
    Sweeping,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::CollectingReferences => "collecting references",
            Phase::ListingBlobs => "listing blobs",
            Phase::Reconciling => "reconciling",
            Phase::Reporting => "reporting",
            Phase::Sweeping => "sweeping",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// How a completed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Report produced; every requested deletion succeeded
    Clean,
    /// Sweep ran but some deletions failed
    PartialFailure,
}

/// Everything a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub report: CleanupReport,
    pub sweep: Option<SweepOutcome>,
}

impl RunOutcome {
    pub fn status(&self) -> RunStatus {
        match &self.sweep {
            Some(outcome) if !outcome.is_complete() => RunStatus::PartialFailure,
            _ => RunStatus::Clean,
        }
    }
}

/// Configured cleanup run.
#[derive(Debug, Clone)]
pub struct Cleanup {
    registry: Registry,
    mode: RunMode,
    format: ReportFormat,
}

impl Cleanup {
    pub fn new(registry: Registry, mode: RunMode) -> Self {
        Self {
            registry,
            mode,
            format: ReportFormat::default(),
        }
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Drive every phase in order.
    ///
    /// The reference source is consumed and released right after collection,
    /// whether collection succeeds or not. A failure while collecting or
    /// listing returns before anything is written to `out` or deleted. Once a
    /// sweep has started, output errors are logged instead of returned, so an
    /// `Err` always means nothing was deleted.
    pub fn run<S, B, W>(&self, source: S, store: &B, out: &mut W) -> Result<RunOutcome>
    where
        S: ReferenceSource,
        B: BlobStore + ?Sized,
        W: Write + ?Sized,
    {
        info!("Starting {} run against {}", self.mode, store.root().display());

        enter(Phase::CollectingReferences);
        let collected = collect_references(&source, &self.registry);
        if let Err(e) = source.close() {
            warn!("Failed to release reference source: {}", e);
        }
        let live = collected?;

        enter(Phase::ListingBlobs);
        let listing = store.list()?;

        enter(Phase::Reconciling);
        let report = reconcile(&live, listing);
        info!(
            "{} of {} files orphaned ({} bytes)",
            report.total_orphaned, report.total_on_disk, report.orphaned_bytes
        );

        enter(Phase::Reporting);
        if self.format == ReportFormat::Text {
            render_report(out, &report, store.root(), self.mode)?;
        }

        let swept = match self.mode {
            RunMode::Delete if report.has_orphans() => {
                enter(Phase::Sweeping);
                let outcome = sweep(store, &report.orphans);
                if self.format == ReportFormat::Text {
                    if let Err(e) = render_sweep(out, &outcome) {
                        warn!("Failed to write sweep summary: {}", e);
                    }
                }
                Some(outcome)
            }
            RunMode::Delete => Some(SweepOutcome::default()),
            RunMode::DryRun => None,
        };

        if self.format == ReportFormat::Json {
            let rendered = render_json(out, &report, swept.as_ref(), store.root(), self.mode);
            match (rendered, &swept) {
                (Err(e), Some(_)) => warn!("Failed to write JSON summary: {}", e),
                (Err(e), None) => return Err(e),
                (Ok(()), _) => {}
            }
        }

        enter(Phase::Done);
        Ok(RunOutcome { report, sweep: swept })
    }
}

fn enter(phase: Phase) {
    debug!("Phase: {}", phase);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::DirBlobStore;
    use crate::error::ReapError;
    use crate::reference::MemoryReferenceSource;
    use std::fs;
    use tempfile::TempDir;

    fn registry() -> Registry {
        Registry::new().with("adopters", "photo_path")
    }

    fn uploads(files: &[(&str, usize)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, size) in files {
            fs::write(dir.path().join(name), vec![0u8; *size]).unwrap();
        }
        dir
    }

    #[test]
    fn test_run_mode_defaults_to_dry_run() {
        assert_eq!(RunMode::default(), RunMode::DryRun);
        assert_eq!(RunMode::DryRun.to_string(), "dry-run");
        assert_eq!(RunMode::Delete.to_string(), "delete");
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = uploads(&[("a.jpg", 100), ("c.pdf", 300)]);
        let source = MemoryReferenceSource::new().with_values("adopters", "photo_path", ["a.jpg"]);
        let mut out = Vec::new();

        let outcome = Cleanup::new(registry(), RunMode::DryRun)
            .run(source, &DirBlobStore::new(dir.path()), &mut out)
            .unwrap();

        assert_eq!(outcome.report.total_orphaned, 1);
        assert!(outcome.sweep.is_none());
        assert_eq!(outcome.status(), RunStatus::Clean);
        assert!(dir.path().join("c.pdf").exists());
        assert!(!out.is_empty());
    }

    #[test]
    fn test_delete_mode_sweeps_orphans() {
        let dir = uploads(&[("a.jpg", 100), ("c.pdf", 300)]);
        let source = MemoryReferenceSource::new().with_values("adopters", "photo_path", ["a.jpg"]);
        let mut out = Vec::new();

        let outcome = Cleanup::new(registry(), RunMode::Delete)
            .run(source, &DirBlobStore::new(dir.path()), &mut out)
            .unwrap();

        let sweep = outcome.sweep.unwrap();
        assert_eq!(sweep.deleted_count(), 1);
        assert_eq!(sweep.deleted_bytes, 300);
        assert!(dir.path().join("a.jpg").exists());
        assert!(!dir.path().join("c.pdf").exists());
    }

    #[test]
    fn test_collection_failure_aborts_without_output() {
        let dir = uploads(&[("a.jpg", 100)]);
        let source = MemoryReferenceSource::new().failing("adopters", "photo_path");
        let mut out = Vec::new();

        let err = Cleanup::new(registry(), RunMode::Delete)
            .run(source, &DirBlobStore::new(dir.path()), &mut out)
            .unwrap_err();

        assert!(matches!(err, ReapError::ReferenceQuery { .. }));
        assert!(out.is_empty());
        assert!(dir.path().join("a.jpg").exists());
    }

    #[test]
    fn test_json_format_emits_one_document() {
        let dir = uploads(&[("c.pdf", 300)]);
        let mut out = Vec::new();

        Cleanup::new(registry(), RunMode::Delete)
            .with_format(ReportFormat::Json)
            .run(MemoryReferenceSource::new(), &DirBlobStore::new(dir.path()), &mut out)
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["mode"], "delete");
        assert_eq!(value["sweep"]["deleted_bytes"], 300);
    }
}
