//! Human-readable and JSON rendering of cleanup results.

use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::cleanup::RunMode;
use crate::error::Result;
use crate::reconcile::CleanupReport;
use crate::sweep::SweepOutcome;

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Output format for the run summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Format a byte count with base-1024 units, two decimals, trailing zeros trimmed.
///
/// `0` is `"0 Bytes"`, `1536` is `"1.5 KB"`, `1048576` is `"1 MB"`.
pub fn format_size(bytes: u64) -> String {
    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < UNITS.len() && bytes >= scale * 1024 {
        scale *= 1024;
        unit += 1;
    }

    let value = ((bytes as f64 / scale as f64) * 100.0).round() / 100.0;
    format!("{} {}", value, UNITS[unit])
}

/// Write the reconciliation summary and per-orphan listing.
pub fn render_report<W: Write + ?Sized>(
    out: &mut W,
    report: &CleanupReport,
    root: &Path,
    mode: RunMode,
) -> Result<()> {
    writeln!(out, "{} {}", "Blob store:".bold(), root.display())?;
    if report.root_missing {
        writeln!(
            out,
            "{}",
            "Warning: blob store root does not exist, treating it as empty".yellow()
        )?;
    }
    writeln!(out, "{} {}", "Mode:".bold(), mode)?;
    writeln!(out, "Referenced files in database: {}", report.total_referenced)?;
    writeln!(out, "Files on disk: {}", report.total_on_disk)?;
    writeln!(out, "Referenced files on disk: {}", report.referenced_on_disk)?;
    writeln!(
        out,
        "Orphaned files: {} ({})",
        report.total_orphaned,
        format_size(report.orphaned_bytes)
    )?;
    if report.skipped_entries > 0 {
        let skipped = format!(
            "Skipped files with non UTF-8 names: {} (not checked, never deleted)",
            report.skipped_entries
        );
        writeln!(out, "{}", skipped.as_str().yellow())?;
    }
    writeln!(out)?;

    if !report.has_orphans() {
        writeln!(out, "{}", "No orphaned files found. Nothing to clean up.".green())?;
        return Ok(());
    }

    writeln!(out, "{}", "Orphaned files:".yellow().bold())?;
    let width = report.orphans.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for entry in &report.orphans {
        writeln!(
            out,
            "  {:<width$}  {}",
            entry.name,
            format_size(entry.size_bytes),
            width = width
        )?;
    }
    writeln!(out)?;

    if mode == RunMode::DryRun {
        writeln!(
            out,
            "{}",
            "Dry run: nothing was deleted. Re-run with --delete to remove these files.".cyan()
        )?;
    }
    Ok(())
}

/// Write the result of a sweep, listing every failed deletion.
pub fn render_sweep<W: Write + ?Sized>(out: &mut W, outcome: &SweepOutcome) -> Result<()> {
    let summary = format!(
        "Deleted {} of {} files ({} of {})",
        outcome.deleted_count(),
        outcome.orphaned_count,
        format_size(outcome.deleted_bytes),
        format_size(outcome.orphaned_bytes)
    );

    if outcome.is_complete() {
        writeln!(out, "{}", summary.as_str().green())?;
        return Ok(());
    }

    writeln!(out, "{}", summary.as_str().yellow())?;
    let failed = format!("{} deletions failed:", outcome.failures.len());
    writeln!(out, "{}", failed.as_str().red().bold())?;
    for failure in &outcome.failures {
        writeln!(out, "  {}: {}", failure.entry.name, failure.reason)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    generated_at: DateTime<Utc>,
    mode: RunMode,
    root: &'a Path,
    report: &'a CleanupReport,
    sweep: Option<&'a SweepOutcome>,
}

/// Write the whole run as a single JSON document.
pub fn render_json<W: Write + ?Sized>(
    out: &mut W,
    report: &CleanupReport,
    sweep: Option<&SweepOutcome>,
    root: &Path,
    mode: RunMode,
) -> Result<()> {
    let summary = JsonSummary {
        generated_at: Utc::now(),
        mode,
        root,
        report,
        sweep,
    };
    serde_json::to_writer_pretty(&mut *out, &summary)?;
    writeln!(out)?;
    Ok(())
}
