//! Table creation and CSV loading for the sales table.

use crate::schema::TableSchema;
use crate::store::SqliteStore;
use crate::telemetry::{db_span, record_db_metrics, DbOperation};
use crate::types::{AssistantError, Result};
use chrono::NaiveDate;
use rusqlite::params;
use serde::Deserialize;
use std::io::Read;

/// One CSV line. Headers match the column names exactly.
#[derive(Debug, Deserialize)]
struct SaleRecord {
    sale_date: String,
    #[serde(rename = "Channel")]
    channel: String,
    #[serde(rename = "Product_Name")]
    product_name: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Quantity")]
    quantity: i64,
    #[serde(rename = "Sales")]
    sales: f64,
}

/// Create the table if it does not exist, creating the database file too.
pub fn initialize(store: &SqliteStore, schema: &TableSchema) -> Result<()> {
    let span = db_span(DbOperation::Import, Some(&schema.name), &store.path().display().to_string());
    let _guard = span.enter();

    let conn = store.open_for_write()?;
    conn.execute(&schema.create_table_sql(), [])?;
    conn.close().map_err(|(_, e)| AssistantError::from(e))?;

    tracing::info!(table = %schema.name, "Table ready");
    Ok(())
}

/// Load sales rows from CSV in a single transaction.
///
/// The table is created first if needed. Any bad record aborts the whole
/// import; nothing is committed.
///
/// # Returns
///
/// Number of rows inserted
///
/// # Errors
///
/// Returns `AssistantError::ImportError` naming the line of the first record
/// with a bad date or field, or `AssistantError::CsvError` for malformed CSV
pub fn import_csv<R: Read>(store: &SqliteStore, schema: &TableSchema, reader: R) -> Result<usize> {
    let span = db_span(DbOperation::Import, Some(&schema.name), &store.path().display().to_string());
    let _guard = span.enter();

    let mut conn = store.open_for_write()?;
    conn.execute(&schema.create_table_sql(), [])?;

    let tx = conn.transaction()?;
    let mut inserted = 0;
    {
        let mut stmt = tx.prepare(&schema.insert_sql())?;
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        for record in csv_reader.deserialize::<SaleRecord>() {
            // header is line 1
            let line = inserted + 2;
            let record = record.map_err(|e| {
                AssistantError::ImportError(format!("line {}: {}", line, e))
            })?;

            NaiveDate::parse_from_str(&record.sale_date, "%Y-%m-%d").map_err(|e| {
                AssistantError::ImportError(format!(
                    "line {}: sale_date '{}' is not YYYY-MM-DD: {}",
                    line, record.sale_date, e
                ))
            })?;

            stmt.execute(params![
                record.sale_date,
                record.channel,
                record.product_name,
                record.city,
                record.quantity,
                record.sales,
            ])?;
            inserted += 1;
        }
    }
    tx.commit()?;

    record_db_metrics(inserted);
    tracing::info!(table = %schema.name, rows = inserted, "Imported sales rows");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{execute, table_exists, AccessMode};
    use crate::types::SqlValue;
    use tempfile::tempdir;

    const CSV: &str = "\
sale_date,Channel,Product_Name,City,Quantity,Sales
2025-01-03,Channel 1,Product 2,City1,5,50.0
2025-01-04, Channel 2 ,Product 1,City2,3,45.5
";

    #[test]
    fn test_initialize_creates_table() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("new.db"));

        initialize(&store, &TableSchema::sales_data()).unwrap();
        initialize(&store, &TableSchema::sales_data()).unwrap();
        assert!(table_exists(&store, "sales_data").unwrap());
    }

    #[test]
    fn test_import_rows() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("import.db"));

        let n = import_csv(&store, &TableSchema::sales_data(), CSV.as_bytes()).unwrap();
        assert_eq!(n, 2);

        let raw = execute(
            &store,
            "SELECT Channel, SUM(Quantity) FROM sales_data GROUP BY Channel ORDER BY Channel",
            AccessMode::ReadOnly,
        )
        .unwrap();
        assert_eq!(raw.rows[1], vec![SqlValue::from("Channel 2"), SqlValue::Integer(3)]);
    }

    #[test]
    fn test_bad_date_rolls_back() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("bad.db"));
        let csv = format!("{}03/01/2025,Channel 1,Product 2,City1,1,1.0\n", CSV);

        let err = import_csv(&store, &TableSchema::sales_data(), csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 4"));

        let raw = execute(&store, "SELECT COUNT(*) FROM sales_data", AccessMode::ReadOnly).unwrap();
        assert_eq!(raw.rows[0][0], SqlValue::Integer(0));
    }

    #[test]
    fn test_bad_number_rejected() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("bad.db"));
        let csv = "sale_date,Channel,Product_Name,City,Quantity,Sales\n2025-01-01,C,P,X,many,1.0\n";

        let err = import_csv(&store, &TableSchema::sales_data(), csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AssistantError::ImportError(_)));
    }
}
