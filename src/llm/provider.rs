//! Text generation collaborator trait.

use crate::types::Result;
use async_trait::async_trait;

/// Anything that can turn instructions plus a question into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion.
    ///
    /// # Arguments
    ///
    /// * `instructions` - Task description, schema, and worked examples
    /// * `question` - User's natural language question
    ///
    /// # Returns
    ///
    /// Raw model text, possibly wrapped in markdown fences
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::LlmError` if the call fails
    async fn generate(&self, instructions: &str, question: &str) -> Result<String>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}
