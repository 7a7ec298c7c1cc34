//! SQLite-backed reference source.

use log::debug;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

use super::ReferenceSource;
use crate::error::{ReapError, Result};
use crate::registry::ReferenceColumn;

/// Read-only connection to the registry database.
///
/// The connection is owned by this value: [`ReferenceSource::close`]
/// releases it explicitly, and dropping the value releases it on any other
/// exit path.
pub struct SqliteReferenceSource {
    db: Connection,
}

impl std::fmt::Debug for SqliteReferenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteReferenceSource")
            .field("path", &self.db.path())
            .finish()
    }
}

impl SqliteReferenceSource {
    /// Open an existing database read-only. A missing file is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| ReapError::ReferenceSource(format!("Failed to open {}: {}", path.display(), e)))?;

        debug!("Opened reference database {}", path.display());
        Ok(Self { db })
    }

    fn query_column(&self, sql: &str) -> rusqlite::Result<Vec<String>> {
        let mut stmt = self.db.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut values = Vec::new();
        for row in rows {
            values.push(row?);
        }
        Ok(values)
    }
}

impl ReferenceSource for SqliteReferenceSource {
    fn column_values(&self, column: &ReferenceColumn) -> Result<Vec<String>> {
        let sql = column.select_sql()?;
        self.query_column(&sql).map_err(|e| ReapError::ReferenceQuery {
            table: column.table.clone(),
            column: column.column.clone(),
            reason: e.to_string(),
        })
    }

    fn close(self) -> Result<()> {
        self.db
            .close()
            .map_err(|(_, e)| ReapError::ReferenceSource(format!("Failed to close database: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_db(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("registry.db");
        let db = Connection::open(&path).unwrap();
        db.execute_batch(
            r#"
            CREATE TABLE adopters (id INTEGER PRIMARY KEY, photo_path TEXT);
            INSERT INTO adopters (photo_path) VALUES ('a.jpg'), (NULL), ('b.png');
            "#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_reads_non_null_values() {
        let dir = TempDir::new().unwrap();
        let source = SqliteReferenceSource::open(create_db(&dir)).unwrap();

        let mut values = source
            .column_values(&ReferenceColumn::new("adopters", "photo_path"))
            .unwrap();
        values.sort();

        assert_eq!(values, vec!["a.jpg".to_string(), "b.png".to_string()]);
        source.close().unwrap();
    }

    #[test]
    fn test_missing_table_is_query_error() {
        let dir = TempDir::new().unwrap();
        let source = SqliteReferenceSource::open(create_db(&dir)).unwrap();

        let err = source
            .column_values(&ReferenceColumn::new("stray_reports", "photo_path"))
            .unwrap_err();
        assert!(matches!(err, ReapError::ReferenceQuery { .. }));
    }

    #[test]
    fn test_invalid_identifier_never_reaches_sql() {
        let dir = TempDir::new().unwrap();
        let source = SqliteReferenceSource::open(create_db(&dir)).unwrap();

        let err = source
            .column_values(&ReferenceColumn::new("adopters\"; DROP TABLE adopters; --", "photo_path"))
            .unwrap_err();
        assert!(matches!(err, ReapError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_open_missing_database_fails() {
        let dir = TempDir::new().unwrap();
        let err = SqliteReferenceSource::open(dir.path().join("missing.db")).unwrap_err();
        assert!(matches!(err, ReapError::ReferenceSource(_)));
        assert!(!dir.path().join("missing.db").exists());
    }

    #[test]
    fn test_connection_is_read_only() {
        let dir = TempDir::new().unwrap();
        let source = SqliteReferenceSource::open(create_db(&dir)).unwrap();
        assert!(source.db.execute("DELETE FROM adopters", []).is_err());
    }
}
