//! Terminal outcomes of one question.

use crate::types::Table;
use std::fmt;
use thiserror::Error;

/// How the display layer should present a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Error,
    Warning,
    Info,
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

/// Every way a question can end without a table.
///
/// The `Display` text is the user-facing message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Failure {
    #[error("Please enter a question.")]
    EmptyQuestion,

    #[error("Error generating SQL: {0}")]
    SynthesisFailure(String),

    #[error("Error generating SQL: the model returned an empty query.")]
    EmptySynthesis,

    #[error("Refusing to run a statement that modifies data ({keyword}).")]
    UnsafeStatement { keyword: String },

    #[error("SQLite error while listing tables: {0}")]
    CatalogFailure(String),

    #[error("Table '{0}' does not exist in the database.")]
    TableMissing(String),

    #[error("SQLite error: {0}")]
    StoreExecutionFailure(String),

    #[error("General error: the generated text contains no SQL statement.")]
    NoStatement,

    #[error("General error: {0}")]
    UnknownFailure(String),

    #[error("Mismatch between the number of columns in the result and the expected structure ({detail}).")]
    ShapeMismatch { detail: String },

    #[error("No data returned.")]
    NoData,
}

impl Failure {
    pub fn level(&self) -> MessageLevel {
        match self {
            Self::EmptyQuestion => MessageLevel::Info,
            Self::NoData => MessageLevel::Warning,
            _ => MessageLevel::Error,
        }
    }
}

/// Result of one question: a table or exactly one classified message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Table(Table),
    Failed(Failure),
}

impl Outcome {
    /// `None` for a table, otherwise the message level.
    pub fn level(&self) -> Option<MessageLevel> {
        match self {
            Self::Table(_) => None,
            Self::Failed(f) => Some(f.level()),
        }
    }

    pub fn table(&self) -> Option<&Table> {
        match self {
            Self::Table(t) => Some(t),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Table(_) => None,
            Self::Failed(f) => Some(f),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level() == Some(MessageLevel::Error)
    }
}

impl From<Failure> for Outcome {
    fn from(failure: Failure) -> Self {
        Self::Failed(failure)
    }
}

/// What the pipeline produced for one question.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Generated SQL, if synthesis got that far
    pub sql: Option<String>,
    pub outcome: Outcome,
}

impl Answer {
    pub(crate) fn without_sql(failure: Failure) -> Self {
        Self {
            sql: None,
            outcome: failure.into(),
        }
    }
}
