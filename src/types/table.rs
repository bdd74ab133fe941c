//! Query results before and after shape validation.

use crate::types::value::SqlValue;
use thiserror::Error;

/// Rows and column labels exactly as fetched from the store.
///
/// Nothing about arity is guaranteed here; convert with [`Table::try_from_raw`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

/// Why a raw result could not become a [`Table`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// The query succeeded but returned nothing.
    #[error("query returned no rows")]
    NoRows,

    /// A row's value count disagrees with the column labels.
    #[error("row {row} has {found} values but the result declares {expected} columns")]
    Arity {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A non-empty result whose every row has one value per column.
///
/// The only way to build one is [`Table::try_from_raw`], so holders never
/// need to re-check arity.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl Table {
    /// Validate the shape of a fetched result.
    ///
    /// # Errors
    ///
    /// - `ShapeError::NoRows` if there are no rows (checked first, so an empty
    ///   result is never reported as a mismatch)
    /// - `ShapeError::Arity` for the first row whose length differs from the
    ///   column count
    pub fn try_from_raw(raw: RawResult) -> Result<Self, ShapeError> {
        if raw.rows.is_empty() {
            return Err(ShapeError::NoRows);
        }

        let expected = raw.columns.len();
        if let Some((row, values)) = raw
            .rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != expected)
        {
            return Err(ShapeError::Arity {
                row,
                expected,
                found: values.len(),
            });
        }

        Ok(Self {
            columns: raw.columns,
            rows: raw.rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&SqlValue>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }
}
