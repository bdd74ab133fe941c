//! Core types shared across stages.

pub mod error;
pub mod value;
pub mod table;

pub use error::{AssistantError, Result};
pub use value::SqlValue;
pub use table::{RawResult, ShapeError, Table};
