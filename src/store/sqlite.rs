//! SQLite store backed by `rusqlite`.

use crate::config::StoreConfig;
use crate::store::{AccessMode, Store, StoreConnection, StoreError, StoreResult};
use crate::types::{RawResult, SqlValue};
use rusqlite::{Batch, Connection, ErrorCode, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Catalog query listing user tables.
pub const CATALOG_SQL: &str = "SELECT name FROM sqlite_master WHERE type='table'";

/// Reported when the text holds more than one statement.
pub const MULTIPLE_STATEMENTS: &str = "You can only execute one statement at a time.";

/// A SQLite database file.
///
/// Queries never create the file: a missing path is reported as
/// `StoreError::Unavailable`. Use [`SqliteStore::open_for_write`] to create it.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_secs(5),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            path: config.path.clone(),
            busy_timeout: config.busy_timeout(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open read-write, creating the file if needed (init and import).
    pub fn open_for_write(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }
}

impl Store for SqliteStore {
    type Connection = SqliteConnection;

    fn connect(&self, mode: AccessMode) -> StoreResult<SqliteConnection> {
        let access = match mode {
            AccessMode::ReadOnly => OpenFlags::SQLITE_OPEN_READ_ONLY,
            AccessMode::ReadWrite => OpenFlags::SQLITE_OPEN_READ_WRITE,
        };

        let conn = Connection::open_with_flags(
            &self.path,
            access | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            StoreError::Unavailable(format!("cannot open {}: {}", self.path.display(), e))
        })?;

        conn.busy_timeout(self.busy_timeout).map_err(classify)?;
        Ok(SqliteConnection { conn })
    }

    fn namespace(&self) -> String {
        self.path.display().to_string()
    }
}

/// Open SQLite connection.
pub struct SqliteConnection {
    conn: Connection,
}

impl StoreConnection for SqliteConnection {
    fn table_names(&mut self) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare(CATALOG_SQL).map_err(classify)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(classify)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(classify)?;
        Ok(names)
    }

    fn query(&mut self, sql: &str) -> StoreResult<RawResult> {
        // Batch skips empty statements, so comments and stray `;` never reach step
        let mut batch = Batch::new(&self.conn, sql);
        let mut stmt = batch.next().map_err(classify)?.ok_or(StoreError::NoStatement)?;
        if batch.next().map_err(classify)?.is_some() {
            return Err(StoreError::Statement(MULTIPLE_STATEMENTS.to_string()));
        }

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let num_cols = stmt.column_count();

        let rows = stmt
            .query([])
            .map_err(classify)?
            .mapped(|r| {
                (0..num_cols)
                    .map(|idx| r.get_ref(idx).map(SqlValue::from))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(classify)?;

        Ok(RawResult { columns, rows })
    }

    fn close(self) -> StoreResult<()> {
        self.conn.close().map_err(|(_, e)| classify(e))
    }
}

/// Split rusqlite errors into statement problems and everything else.
///
/// Statement errors carry SQLite's own message, without the SQL text and
/// offset rusqlite appends for compile errors.
pub(crate) fn classify(err: rusqlite::Error) -> StoreError {
    use rusqlite::Error;

    match &err {
        Error::SqlInputError { error, msg, .. } if is_statement_code(error.code) => {
            StoreError::Statement(msg.clone())
        }
        Error::SqliteFailure(e, _) if is_statement_code(e.code) => StoreError::Statement(err.to_string()),
        Error::InvalidQuery | Error::InvalidColumnName(_) | Error::InvalidParameterCount(_, _) => {
            StoreError::Statement(err.to_string())
        }
        _ => StoreError::Unavailable(err.to_string()),
    }
}

fn is_statement_code(code: ErrorCode) -> bool {
    !matches!(
        code,
        ErrorCode::CannotOpen
            | ErrorCode::SystemIoFailure
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::DiskFull
            | ErrorCode::OutOfMemory
            | ErrorCode::PermissionDenied
            | ErrorCode::InternalMalfunction
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::with_connection;
    use tempfile::tempdir;

    fn seeded(dir: &Path) -> SqliteStore {
        let store = SqliteStore::new(dir.join("test.db"));
        let conn = store.open_for_write().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (a INTEGER, b TEXT, c REAL, d BLOB);
             INSERT INTO t VALUES (1, 'x', 1.5, x'0102'), (NULL, NULL, NULL, NULL);",
        )
        .unwrap();
        store
    }

    #[test]
    fn test_query_typed_values() {
        let dir = tempdir().unwrap();
        let store = seeded(dir.path());

        let result = with_connection(&store, AccessMode::ReadOnly, |c| {
            c.query("SELECT a, b, c, d FROM t ORDER BY a DESC")
        })
        .unwrap();

        assert_eq!(result.columns, vec!["a", "b", "c", "d"]);
        assert_eq!(
            result.rows[0],
            vec![
                SqlValue::Integer(1),
                SqlValue::from("x"),
                SqlValue::Real(1.5),
                SqlValue::Blob(vec![1, 2])
            ]
        );
        assert!(result.rows[1].iter().all(SqlValue::is_null));
    }

    #[test]
    fn test_catalog() {
        let dir = tempdir().unwrap();
        let store = seeded(dir.path());

        let names = with_connection(&store, AccessMode::ReadOnly, |c| c.table_names()).unwrap();
        assert_eq!(names, vec!["t"]);
    }

    #[test]
    fn test_bad_statement_is_statement_error() {
        let dir = tempdir().unwrap();
        let store = seeded(dir.path());

        let err = with_connection(&store, AccessMode::ReadOnly, |c| c.query("SELECT nope FROM t"))
            .unwrap_err();
        assert_eq!(err, StoreError::Statement("no such column: nope".to_string()));

        let err = with_connection(&store, AccessMode::ReadOnly, |c| c.query("SELEC 1")).unwrap_err();
        assert!(matches!(err, StoreError::Statement(_)));
    }

    #[test]
    fn test_multiple_statements_rejected() {
        let dir = tempdir().unwrap();
        let store = seeded(dir.path());

        let err = with_connection(&store, AccessMode::ReadWrite, |c| {
            c.query("SELECT 1; SELECT 2")
        })
        .unwrap_err();
        assert_eq!(err, StoreError::Statement(MULTIPLE_STATEMENTS.to_string()));

        let err = with_connection(&store, AccessMode::ReadWrite, |c| {
            c.query("SELECT COUNT(*) FROM t; DELETE FROM t")
        })
        .unwrap_err();
        assert!(matches!(err, StoreError::Statement(_)));

        let count = with_connection(&store, AccessMode::ReadOnly, |c| c.query("SELECT COUNT(*) FROM t"))
            .unwrap();
        assert_eq!(count.rows[0][0], SqlValue::Integer(2));
    }

    #[test]
    fn test_trailing_semicolon_and_comment_allowed() {
        let dir = tempdir().unwrap();
        let store = seeded(dir.path());

        let result = with_connection(&store, AccessMode::ReadOnly, |c| {
            c.query("SELECT 1 AS one; -- done\n")
        })
        .unwrap();
        assert_eq!(result.rows, vec![vec![SqlValue::Integer(1)]]);
    }

    #[test]
    fn test_text_without_statement() {
        let dir = tempdir().unwrap();
        let store = seeded(dir.path());

        for sql in [";", "-- I cannot answer that", "/* nothing */ ;"] {
            let err = with_connection(&store, AccessMode::ReadOnly, |c| c.query(sql)).unwrap_err();
            assert_eq!(err, StoreError::NoStatement, "{sql:?}");
        }
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let dir = tempdir().unwrap();
        let store = seeded(dir.path());

        let err = with_connection(&store, AccessMode::ReadOnly, |c| c.query("DELETE FROM t"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Statement(_)));

        let count = with_connection(&store, AccessMode::ReadOnly, |c| c.query("SELECT COUNT(*) FROM t"))
            .unwrap();
        assert_eq!(count.rows[0][0], SqlValue::Integer(2));
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("absent.db"));

        let err = store.connect(AccessMode::ReadWrite).err().unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(!dir.path().join("absent.db").exists());
    }
}
