//! In-memory reference source.

use std::collections::{HashMap, HashSet};

use super::ReferenceSource;
use crate::error::{ReapError, Result};
use crate::registry::ReferenceColumn;

/// Reference source backed by canned column values.
///
/// Columns without values read as empty. Columns marked with
/// [`MemoryReferenceSource::failing`] return a query error.
#[derive(Debug, Clone, Default)]
pub struct MemoryReferenceSource {
    values: HashMap<ReferenceColumn, Vec<String>>,
    failing: HashSet<ReferenceColumn>,
}

impl MemoryReferenceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, S>(mut self, table: &str, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values
            .entry(ReferenceColumn::new(table, column))
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn failing(mut self, table: &str, column: &str) -> Self {
        self.failing.insert(ReferenceColumn::new(table, column));
        self
    }

    /// Add a reference after construction, e.g. to model a row inserted mid-run.
    pub fn insert(&mut self, table: &str, column: &str, value: impl Into<String>) {
        self.values
            .entry(ReferenceColumn::new(table, column))
            .or_default()
            .push(value.into());
    }
}

impl ReferenceSource for MemoryReferenceSource {
    fn column_values(&self, column: &ReferenceColumn) -> Result<Vec<String>> {
        if self.failing.contains(column) {
            return Err(ReapError::ReferenceQuery {
                table: column.table.clone(),
                column: column.column.clone(),
                reason: "simulated query failure".to_string(),
            });
        }
        Ok(self.values.get(column).cloned().unwrap_or_default())
    }
}
