//! Schema guard: confirm the target table exists before running anything.

use crate::store::{with_connection, AccessMode, Store, StoreConnection, StoreResult};
use crate::telemetry::{db_span, record_db_metrics, DbOperation};

/// Fetch the current table catalog on a connection scoped to this call.
pub fn list_tables<S: Store>(store: &S) -> StoreResult<Vec<String>> {
    let span = db_span(DbOperation::Catalog, None, &store.namespace());
    let _guard = span.enter();

    let tables = with_connection(store, AccessMode::ReadOnly, |conn| conn.table_names())?;
    record_db_metrics(tables.len());
    Ok(tables)
}

/// Whether `table` is in the live catalog (exact, case-sensitive match).
///
/// # Errors
///
/// Returns the store error if the catalog cannot be read; callers treat that
/// as blocking, like a missing table.
pub fn table_exists<S: Store>(store: &S, table: &str) -> StoreResult<bool> {
    let exists = list_tables(store)?.iter().any(|name| name == table);
    tracing::debug!(table, exists, "Checked table catalog");
    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SqliteStore, StoreError};
    use tempfile::tempdir;

    #[test]
    fn test_table_exists() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("g.db"));
        store
            .open_for_write()
            .unwrap()
            .execute_batch("CREATE TABLE sales_data (x INTEGER)")
            .unwrap();

        assert!(table_exists(&store, "sales_data").unwrap());
        assert!(!table_exists(&store, "SALES_DATA").unwrap());
        assert!(!table_exists(&store, "orders").unwrap());
    }

    #[test]
    fn test_empty_database() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("empty.db"));
        store.open_for_write().unwrap().execute_batch("PRAGMA user_version = 1").unwrap();

        assert!(list_tables(&store).unwrap().is_empty());
        assert!(!table_exists(&store, "sales_data").unwrap());
    }

    #[test]
    fn test_unreadable_catalog() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, b"this is definitely not a sqlite database file").unwrap();

        let err = table_exists(&SqliteStore::new(&path), "sales_data").unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
