//! Question → SQL → guard → execute → shape.
//!
//! Each stage converts its own failures into a [`Failure`]; nothing is
//! retried and nothing escapes as a panic. The first failing stage ends the
//! question.

pub mod outcome;
pub mod policy;

pub use outcome::{Answer, Failure, MessageLevel, Outcome};
pub use policy::MutationGuard;

use crate::llm::{QuerySynthesizer, SynthesisError};
use crate::store::{execute, table_exists, AccessMode, Store, StoreError};
use crate::types::{RawResult, ShapeError, Table};

/// Runs statements against one table: mutation check, schema guard,
/// execution, and shaping.
pub struct StatementRunner<S: Store> {
    store: S,
    table: String,
    mutation_guard: Option<MutationGuard>,
}

impl<S: Store> StatementRunner<S> {
    pub fn new(store: S, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            mutation_guard: None,
        }
    }

    /// Reject mutating statements and run queries on a read-only connection.
    pub fn reject_mutations(mut self, enabled: bool) -> Self {
        self.mutation_guard = enabled.then(MutationGuard::new);
        self
    }

    /// Run a statement through the guard, executor, and shaping stages.
    pub fn run(&self, sql: &str) -> Outcome {
        match self.guard_and_execute(sql) {
            Ok(table) => Outcome::Table(table),
            Err(failure) => {
                tracing::info!(severity = %failure.level(), failure = %failure, "Question ended without a table");
                Outcome::Failed(failure)
            }
        }
    }

    fn guard_and_execute(&self, sql: &str) -> Result<Table, Failure> {
        if let Some(guard) = &self.mutation_guard {
            if let Some(keyword) = guard.offending_keyword(sql) {
                return Err(Failure::UnsafeStatement { keyword });
            }
        }

        match table_exists(&self.store, &self.table) {
            Ok(true) => {}
            Ok(false) => return Err(Failure::TableMissing(self.table.clone())),
            Err(e) => return Err(Failure::CatalogFailure(e.to_string())),
        }

        let mode = if self.mutation_guard.is_some() {
            AccessMode::ReadOnly
        } else {
            AccessMode::ReadWrite
        };

        let raw = execute(&self.store, sql, mode).map_err(|e| match e {
            StoreError::Statement(msg) => Failure::StoreExecutionFailure(msg),
            StoreError::Unavailable(msg) => Failure::UnknownFailure(msg),
            StoreError::NoStatement => Failure::NoStatement,
        })?;

        shape(raw)
    }
}

/// Answers natural language questions about one table in one store.
pub struct Pipeline<S: Store> {
    synthesizer: QuerySynthesizer,
    runner: StatementRunner<S>,
}

impl<S: Store> Pipeline<S> {
    /// Create a pipeline guarding the table named in the synthesizer's context.
    pub fn new(synthesizer: QuerySynthesizer, store: S) -> Self {
        let runner = StatementRunner::new(store, synthesizer.context().table());
        Self {
            synthesizer,
            runner,
        }
    }

    /// See [`StatementRunner::reject_mutations`].
    pub fn reject_mutations(mut self, enabled: bool) -> Self {
        self.runner = self.runner.reject_mutations(enabled);
        self
    }

    /// Answer one question.
    ///
    /// # Returns
    ///
    /// The generated SQL (when synthesis succeeded) and the outcome: a table,
    /// or exactly one classified failure
    pub async fn ask(&self, question: &str) -> Answer {
        let question = question.trim();
        if question.is_empty() {
            return Answer::without_sql(Failure::EmptyQuestion);
        }

        let sql = match self.synthesizer.synthesize(question).await {
            Ok(sql) => sql,
            Err(SynthesisError::Failed(msg)) => {
                return Answer::without_sql(Failure::SynthesisFailure(msg))
            }
            Err(SynthesisError::Empty) => return Answer::without_sql(Failure::EmptySynthesis),
        };

        let outcome = self.runner.run(&sql);
        Answer {
            sql: Some(sql),
            outcome,
        }
    }
}

/// Turn fetched rows into a table, or the matching failure.
///
/// Zero rows is `NoData` (a warning) and is checked before arity, so an empty
/// result is never reported as a shape mismatch.
pub fn shape(raw: RawResult) -> Result<Table, Failure> {
    Table::try_from_raw(raw).map_err(|e| match e {
        ShapeError::NoRows => Failure::NoData,
        arity @ ShapeError::Arity { .. } => Failure::ShapeMismatch {
            detail: arity.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlValue;

    #[test]
    fn test_shape_no_rows() {
        let raw = RawResult {
            columns: vec!["City".into()],
            rows: vec![],
        };
        assert_eq!(shape(raw), Err(Failure::NoData));
    }

    #[test]
    fn test_shape_mismatch() {
        let raw = RawResult {
            columns: vec!["City".into(), "Total".into()],
            rows: vec![vec![SqlValue::from("City1")]],
        };
        let err = shape(raw).unwrap_err();
        assert!(matches!(err, Failure::ShapeMismatch { .. }));
        assert_eq!(err.level(), MessageLevel::Error);
    }

    #[test]
    fn test_shape_ok() {
        let raw = RawResult {
            columns: vec!["n".into()],
            rows: vec![vec![SqlValue::Integer(1)]],
        };
        assert_eq!(shape(raw).unwrap().row_count(), 1);
    }
}
