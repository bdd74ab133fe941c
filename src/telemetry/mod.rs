//! Logging setup and database spans.

pub mod db;

pub use db::{db_query_span, db_span, record_db_metrics, DbOperation};

use crate::types::{AssistantError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` for this crate when
/// `verbose` is true. Logs go to stderr so stdout stays clean for results.
pub fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose { "warn,sales_sql=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| AssistantError::config(format!("logging init failed: {}", e)))
}
