//! Declarative registry of database columns that hold upload file names.
//!
//! Adding a table that references uploads means adding an entry here (or in
//! the `registry:` section of the config file), never new control flow.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ReapError, Result};

/// One column known to store blob store file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceColumn {
    pub table: String,
    pub column: String,
}

impl ReferenceColumn {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Check that both names are plain SQL identifiers.
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.table)?;
        validate_identifier(&self.column)
    }

    /// NULL-safe projection of this column.
    ///
    /// Identifiers are validated first, so quoting them is enough.
    pub fn select_sql(&self) -> Result<String> {
        self.validate()?;
        Ok(format!(
            "SELECT \"{col}\" FROM \"{table}\" WHERE \"{col}\" IS NOT NULL",
            col = self.column,
            table = self.table,
        ))
    }
}

impl fmt::Display for ReferenceColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ReapError::InvalidIdentifier(name.to_string()))
    }
}

/// Ordered, de-duplicated set of reference columns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ReferenceColumn>", into = "Vec<ReferenceColumn>")]
pub struct Registry {
    columns: Vec<ReferenceColumn>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns of the pet registration schema that point into the uploads directory.
    pub fn pet_registration() -> Self {
        Self::new()
            .with("pet_documents", "front_photo_path")
            .with("pet_documents", "rear_photo_path")
            .with("pet_documents", "qr_code_path")
            .with("health_records", "vaccination_card_path")
            .with("adopters", "dni_front_path")
            .with("adopters", "dni_back_path")
            .with("adopters", "photo_path")
            .with("stray_reports", "photo_path")
    }

    /// Builder-style registration.
    pub fn with(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.register(ReferenceColumn::new(table, column));
        self
    }

    /// Add a column. Returns false if it was already registered.
    pub fn register(&mut self, column: ReferenceColumn) -> bool {
        if self.columns.contains(&column) {
            return false;
        }
        self.columns.push(column);
        true
    }

    /// Validate every entry. An empty registry is rejected, since it would
    /// classify every upload as an orphan.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(ReapError::Config("reference registry is empty".to_string()));
        }
        self.columns.iter().try_for_each(ReferenceColumn::validate)
    }

    pub fn columns(&self) -> &[ReferenceColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl From<Vec<ReferenceColumn>> for Registry {
    fn from(columns: Vec<ReferenceColumn>) -> Self {
        let mut registry = Self::new();
        for column in columns {
            registry.register(column);
        }
        registry
    }
}

impl From<Registry> for Vec<ReferenceColumn> {
    fn from(registry: Registry) -> Self {
        registry.columns
    }
}
