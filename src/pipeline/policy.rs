//! Opt-in guard against statements that modify data.

use regex::Regex;

/// Keywords that mark a statement as mutating.
const MUTATING_KEYWORDS: &str = r"(?i)\b(DROP|DELETE|UPDATE|INSERT|ALTER)\b";

/// Rejects statements containing a mutating keyword as a whole word.
///
/// This is a keyword scan, not a parser: a string literal such as
/// `'delete'` is also rejected.
#[derive(Debug, Clone)]
pub struct MutationGuard {
    pattern: Regex,
}

impl Default for MutationGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl MutationGuard {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(MUTATING_KEYWORDS).expect("keyword pattern is valid"),
        }
    }

    /// The first mutating keyword found, upper-cased.
    pub fn offending_keyword(&self, sql: &str) -> Option<String> {
        self.pattern
            .find(sql)
            .map(|m| m.as_str().to_ascii_uppercase())
    }
}
