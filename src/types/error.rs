//! Error types for the assistant's plumbing.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `From` implementations.
//! Pipeline outcomes shown to the user live in [`crate::pipeline::Failure`]; this type
//! covers configuration, collaborator calls, and the import path.

use thiserror::Error;

/// Error type for library operations outside the question pipeline.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Configuration missing or invalid
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Text generation call failed
    #[error("LLM request failed: {0}")]
    LlmError(String),

    /// CSV import rejected a record
    #[error("Import failed: {0}")]
    ImportError(String),

    /// Storage layer error (SQLite)
    #[error("Storage error: {0}")]
    StorageError(#[from] rusqlite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// CSV reader/writer error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// HTTP client error (LLM APIs)
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl AssistantError {
    /// Create a configuration error with context.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create an LLM error with context.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::LlmError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AssistantError::config("missing key").to_string(),
            "Configuration error: missing key"
        );
        assert_eq!(
            AssistantError::llm("quota exceeded").to_string(),
            "LLM request failed: quota exceeded"
        );
    }

    #[test]
    fn test_error_from_conversions() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(AssistantError::from(io), AssistantError::IoError(_)));

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(AssistantError::from(json), AssistantError::JsonError(_)));
    }
}
