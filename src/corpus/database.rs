// Database source: reads training-only text rows from SQLite.
//
// The table is expected to expose an integer `index` column and a `TEXT`
// column (the layout a pandas `to_sql` export produces). Rows are read in
// the order SQLite returns them. Nothing else about the schema is assumed.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use tracing::info;

/// Default table name holding the training rows.
pub const DEFAULT_TABLE: &str = "mydata";

/// One row from the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseRow {
    pub index: i64,
    /// `None` when the TEXT column is SQL NULL.
    pub text: Option<String>,
}

/// Open an existing database read-only (fails if it doesn't exist).
pub fn open(db_path: &Path) -> Result<Connection> {
    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {}.\n\
             Set ABSTRACT2VEC_DB_PATH to the SQLite file, or to an empty value to skip it.",
            db_path.display()
        );
    }

    Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open database at {}", db_path.display()))
}

/// Read every (index, TEXT) row from `table`.
pub fn read_rows(conn: &Connection, table: &str) -> Result<Vec<DatabaseRow>> {
    let sql = format!(
        "SELECT \"index\", \"TEXT\" FROM {}",
        quote_identifier(table)
    );
    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("Failed to query table {table}"))?;

    let rows = stmt
        .query_map([], |row| {
            Ok(DatabaseRow {
                index: row.get(0)?,
                text: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read rows from {table}"))?;

    info!(table = table, rows = rows.len(), "Retrieved database rows");
    Ok(rows)
}

/// Open `db_path` and read all rows from `table`.
pub fn load_rows(db_path: &Path, table: &str) -> Result<Vec<DatabaseRow>> {
    let conn = open(db_path)?;
    read_rows(&conn, table)
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE mydata (\"index\" INTEGER, \"TEXT\" TEXT);
             INSERT INTO mydata VALUES (0, 'patient admitted with chest pain');
             INSERT INTO mydata VALUES (7, NULL);
             INSERT INTO mydata VALUES (3, 'discharge summary');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_read_rows_in_table_order() {
        let conn = fixture();
        let rows = read_rows(&conn, "mydata").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[0].text.as_deref(), Some("patient admitted with chest pain"));
        assert_eq!(rows[1].index, 7);
        assert!(rows[1].text.is_none());
        assert_eq!(rows[2].index, 3);
    }

    #[test]
    fn test_read_rows_missing_table_fails() {
        let conn = fixture();
        assert!(read_rows(&conn, "nope").is_err());
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = open(&dir.path().join("missing.db")).unwrap_err();
        assert!(err.to_string().contains("Database not found"));
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("my\"table"), "\"my\"\"table\"");
    }
}
