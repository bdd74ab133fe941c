//! The one table the assistant knows about.

use serde::{Deserialize, Serialize};

/// Default table name.
pub const SALES_TABLE: &str = "sales_data";

/// Column declaration for prompt rendering and table creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnSpec {
    /// Column name (case as stored)
    pub name: String,

    /// SQLite declared type
    pub sql_type: String,

    /// Short hint for the model
    pub description: String,
}

impl ColumnSpec {
    fn new(name: &str, sql_type: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            description: description.to_string(),
        }
    }
}

/// Table declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// `sales_data` with its six columns.
    pub fn sales_data() -> Self {
        Self::sales_data_named(SALES_TABLE)
    }

    /// Same columns under a different table name.
    pub fn sales_data_named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: vec![
                ColumnSpec::new("sale_date", "TEXT", "ISO date YYYY-MM-DD"),
                ColumnSpec::new("Channel", "TEXT", "sales channel, e.g. 'Channel 1'"),
                ColumnSpec::new("Product_Name", "TEXT", "product, e.g. 'Product 2'"),
                ColumnSpec::new("City", "TEXT", "city, e.g. 'City1'"),
                ColumnSpec::new("Quantity", "INTEGER", "units sold"),
                ColumnSpec::new("Sales", "REAL", "sales amount"),
            ],
        }
    }

    /// Comma-separated column names, in declaration order.
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this schema.
    pub fn create_table_sql(&self) -> String {
        let cols = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.sql_type))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE IF NOT EXISTS {} ({})", self.name, cols)
    }

    /// `INSERT` statement with one positional parameter per column.
    pub fn insert_sql(&self) -> String {
        let placeholders = (1..=self.columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            self.column_list(),
            placeholders
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sales_data_columns() {
        let schema = TableSchema::sales_data();
        assert_eq!(schema.name, "sales_data");
        assert_eq!(
            schema.column_list(),
            "sale_date, Channel, Product_Name, City, Quantity, Sales"
        );
    }

    #[test]
    fn test_generated_sql() {
        let schema = TableSchema::sales_data();
        assert_eq!(
            schema.create_table_sql(),
            "CREATE TABLE IF NOT EXISTS sales_data (sale_date TEXT, Channel TEXT, \
             Product_Name TEXT, City TEXT, Quantity INTEGER, Sales REAL)"
        );
        assert!(schema.insert_sql().ends_with("VALUES (?1, ?2, ?3, ?4, ?5, ?6)"));
    }
}
