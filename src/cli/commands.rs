//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - (none): reconcile uploads against the database and report orphans
//! - sources: print the reference registry without touching any resource

use blobreap::RunMode;
use blobreap::report::ReportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Blobreap - find and remove uploaded files no database row references
#[derive(Parser, Debug)]
#[command(name = "blobreap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Report orphaned files without deleting anything (default)
    #[arg(long, conflicts_with = "delete")]
    pub dry_run: bool,

    /// Delete orphaned files after reporting them
    #[arg(long)]
    pub delete: bool,

    /// Registry database file (overrides config)
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Upload directory to scan (overrides config)
    #[arg(short, long)]
    pub uploads: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Deletion only happens when asked for by flag.
    pub fn run_mode(&self) -> RunMode {
        if self.delete { RunMode::Delete } else { RunMode::DryRun }
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the table columns scanned for file references
    Sources,
}
