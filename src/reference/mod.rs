//! Reference collection: builds the set of upload names still in use.
//!
//! Every registered column is read independently. Any failure aborts the
//! whole collection, because a partial set would make referenced files look
//! orphaned.

mod memory;
mod sqlite;

use log::{debug, info};
use std::collections::HashSet;

use crate::error::Result;
use crate::registry::{ReferenceColumn, Registry};

pub use memory::MemoryReferenceSource;
pub use sqlite::SqliteReferenceSource;

/// Read-only access to the tables that hold blob references.
pub trait ReferenceSource {
    /// All non-NULL values of one column. Order is irrelevant.
    fn column_values(&self, column: &ReferenceColumn) -> Result<Vec<String>>;

    /// Release the underlying connection. Dropping the source releases it too;
    /// this variant surfaces errors from doing so.
    fn close(self) -> Result<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

impl<T: ReferenceSource + ?Sized> ReferenceSource for &T {
    fn column_values(&self, column: &ReferenceColumn) -> Result<Vec<String>> {
        (**self).column_values(column)
    }
}

/// Union of every referenced blob name for one run.
///
/// Names compare by exact string equality; no case folding, separator or
/// URL-encoding normalization is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveReferenceSet {
    paths: HashSet<String>,
}

impl LiveReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name. Empty strings never name a file and are ignored.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if path.is_empty() {
            return false;
        }
        self.paths.insert(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for LiveReferenceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for LiveReferenceSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for path in iter {
            self.insert(path);
        }
    }
}

/// Query every registered column and union the results.
pub fn collect_references<S: ReferenceSource + ?Sized>(
    source: &S,
    registry: &Registry,
) -> Result<LiveReferenceSet> {
    registry.validate()?;

    let mut live = LiveReferenceSet::new();
    for column in registry.columns() {
        let values = source.column_values(column)?;
        debug!("{}: {} non-null references", column, values.len());
        live.extend(values);
    }

    info!(
        "Collected {} distinct references from {} columns",
        live.len(),
        registry.len()
    );
    Ok(live)
}
