//! Relational store access.
//!
//! Every operation opens its own connection and closes it before returning;
//! nothing is pooled or held between stages.

pub mod sqlite;
pub mod guard;
pub mod executor;
pub mod import;

pub use sqlite::{SqliteConnection, SqliteStore};
pub use guard::{list_tables, table_exists};
pub use executor::execute;

use crate::types::RawResult;
use thiserror::Error;

/// Store failure, split by who is at fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store rejected the statement (syntax, unknown column, constraint,
    /// busy timeout). Carries the store's own message.
    #[error("{0}")]
    Statement(String),

    /// Anything else: cannot open, I/O, corruption, value decoding.
    #[error("{0}")]
    Unavailable(String),

    /// The text holds only whitespace, comments, or `;`.
    #[error("no SQL statement to execute")]
    NoStatement,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// How a connection may touch the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

/// A database the pipeline can connect to.
pub trait Store {
    type Connection: StoreConnection;

    /// Open a new connection.
    fn connect(&self, mode: AccessMode) -> StoreResult<Self::Connection>;

    /// Label for logs and spans (usually the file path).
    fn namespace(&self) -> String;
}

/// One open connection.
pub trait StoreConnection {
    /// Names of all tables in the catalog.
    fn table_names(&mut self) -> StoreResult<Vec<String>>;

    /// Run a statement verbatim and fetch every row.
    fn query(&mut self, sql: &str) -> StoreResult<RawResult>;

    /// Release the connection.
    fn close(self) -> StoreResult<()>;
}

/// Run `f` on a fresh connection, closing it on every path.
///
/// A failure to close is logged; the result of `f` is still returned.
pub fn with_connection<S, T, F>(store: &S, mode: AccessMode, f: F) -> StoreResult<T>
where
    S: Store,
    F: FnOnce(&mut S::Connection) -> StoreResult<T>,
{
    let mut conn = store.connect(mode)?;
    let result = f(&mut conn);

    if let Err(e) = conn.close() {
        tracing::warn!(store = %store.namespace(), error = %e, "Failed to close store connection");
    }

    result
}
