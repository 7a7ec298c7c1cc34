//! Blobreap - reconciles an upload directory against the database rows that
//! reference it, and removes files nothing points to any more.
//!
//! A run collects every referenced file name from the registered table
//! columns, lists the upload directory, reports the difference, and deletes
//! the orphans only when asked to.

pub mod blob;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod reference;
pub mod registry;
pub mod report;
pub mod sweep;

pub use blob::{BlobEntry, BlobListing, BlobStore, DirBlobStore};
pub use cleanup::{Cleanup, Phase, RunMode, RunOutcome, RunStatus};
pub use config::Config;
pub use error::{ReapError, Result};
pub use reconcile::{CleanupReport, reconcile};
pub use reference::{LiveReferenceSet, ReferenceSource, collect_references};
pub use registry::{ReferenceColumn, Registry};
pub use sweep::{SweepFailure, SweepOutcome, sweep};
