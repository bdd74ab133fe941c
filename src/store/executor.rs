//! Query executor.

use crate::store::{with_connection, AccessMode, Store, StoreConnection, StoreResult};
use crate::telemetry::{db_query_span, record_db_metrics};
use crate::types::RawResult;

/// Run `sql` verbatim on a fresh connection and fetch all rows.
///
/// The connection is closed before returning on success and failure alike.
/// No partial result is ever returned.
///
/// # Errors
///
/// - `StoreError::Statement` if the store rejects the statement
/// - `StoreError::Unavailable` for connection, I/O, or decoding failures
pub fn execute<S: Store>(store: &S, sql: &str, mode: AccessMode) -> StoreResult<RawResult> {
    let span = db_query_span(sql, &store.namespace());
    let _guard = span.enter();

    let result = with_connection(store, mode, |conn| conn.query(sql));
    match &result {
        Ok(raw) => {
            record_db_metrics(raw.rows.len());
            tracing::debug!(rows = raw.rows.len(), columns = raw.columns.len(), "Query executed");
        }
        Err(e) => tracing::warn!(error = %e, "Query failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SqliteStore, StoreError};
    use crate::types::SqlValue;
    use tempfile::tempdir;

    #[test]
    fn test_execute_select() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("e.db"));
        store.open_for_write().unwrap().execute_batch("PRAGMA user_version = 1").unwrap();

        let raw = execute(&store, "SELECT 1 AS one, 'a' AS letter", AccessMode::ReadOnly).unwrap();
        assert_eq!(raw.columns, vec!["one", "letter"]);
        assert_eq!(raw.rows, vec![vec![SqlValue::Integer(1), SqlValue::from("a")]]);
    }

    #[test]
    fn test_execute_invalid_sql() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("e.db"));
        store.open_for_write().unwrap().execute_batch("PRAGMA user_version = 1").unwrap();

        let err = execute(&store, "SELECT * FROM missing", AccessMode::ReadOnly).unwrap_err();
        assert_eq!(err, StoreError::Statement("no such table: missing".to_string()));
    }
}
