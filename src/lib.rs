//! sales-sql - natural language questions over a SQLite sales table
//!
//! A question flows through three stages:
//! - Query synthesis: an LLM turns the question into one SQL statement
//! - Schema guard: the target table must exist in the live catalog
//! - Execution and shaping: rows are fetched and checked for consistent arity
//!
//! Every stage reports failure as a value; see [`pipeline::Failure`].

pub mod types;
pub mod config;
pub mod schema;
pub mod llm;
pub mod store;
pub mod pipeline;
pub mod render;
pub mod telemetry;

pub use config::{Config, LlmConfig, StoreConfig};
pub use pipeline::{Answer, Failure, MessageLevel, Outcome, Pipeline, StatementRunner};
pub use types::{AssistantError, Result, SqlValue, Table};
