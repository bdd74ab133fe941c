//! Natural language question to SQL text.

use crate::llm::prompt::InstructionContext;
use crate::llm::provider::TextGenerator;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use thiserror::Error;

/// Why no query came back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// The text generator call failed; carries its message.
    #[error("{0}")]
    Failed(String),

    /// The call succeeded but left nothing after stripping.
    #[error("model returned an empty query")]
    Empty,
}

/// Turns questions into SQL using a text generator and a fixed context.
pub struct QuerySynthesizer {
    generator: Arc<dyn TextGenerator>,
    context: Arc<InstructionContext>,
}

impl QuerySynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>, context: Arc<InstructionContext>) -> Self {
        Self { generator, context }
    }

    pub fn context(&self) -> &InstructionContext {
        &self.context
    }

    /// Generate one SQL statement for a question.
    ///
    /// # Returns
    ///
    /// Statement text with markdown fences removed, never empty
    ///
    /// # Errors
    ///
    /// - `SynthesisError::Failed` if the generator call fails (no retry)
    /// - `SynthesisError::Empty` if the response is blank once stripped
    pub async fn synthesize(&self, question: &str) -> Result<String, SynthesisError> {
        let raw = self
            .generator
            .generate(self.context.text(), question)
            .await
            .map_err(|e| {
                tracing::warn!(model = self.generator.model(), error = %e, "SQL generation failed");
                SynthesisError::Failed(e.to_string())
            })?;

        let sql = strip_code_fences(&raw);
        if sql.is_empty() {
            tracing::warn!(model = self.generator.model(), "SQL generation returned blank text");
            return Err(SynthesisError::Empty);
        }

        tracing::info!(model = self.generator.model(), sql = %sql, "Generated SQL");
        Ok(sql)
    }
}

/// Fence marker with an optional `sql`/`sqlite` language tag.
static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```(?:(?:sqlite|sql)\b)?").expect("fence pattern is valid"));

/// Strip markdown code fences from LLM response.
///
/// Handles:
/// - ```sql ... ``` (any case, also ```sqlite)
/// - ``` ... ```
/// - fences after leading prose, and stray ``` anywhere in the text
///
/// Removal repeats until no marker is left, since deleting one can join the
/// backticks on either side into a new one. The result is trimmed and
/// fence-free, so applying this twice gives the same text as applying it once.
pub fn strip_code_fences(text: &str) -> String {
    let mut sql = text.to_string();
    while FENCE.is_match(&sql) {
        sql = FENCE.replace_all(&sql, "").into_owned();
    }
    sql.trim().to_string()
}
