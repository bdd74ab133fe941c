//! Assistant configuration.
//!
//! Built once at startup and passed explicitly to the components that need
//! it; nothing reads the environment at call time.

use crate::llm::LlmProvider;
use crate::schema::SALES_TABLE;
use crate::types::{AssistantError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default translation model (Gemini Flash Lite).
pub const DEFAULT_MODEL: &str = "models/gemini-2.0-flash-lite";

/// Environment variable selecting the model.
pub const MODEL_ENV: &str = "SALES_SQL_MODEL";

/// Text-generation collaborator settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier; also selects the provider
    #[serde(default = "default_model")]
    pub model: String,

    /// API key for the provider
    #[serde(default)]
    pub api_key: String,

    /// Override for the provider's base URL
    #[serde(default)]
    pub api_base: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: String::new(),
            api_base: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("model", &self.model)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LlmConfig {
    /// Create config for a model and key with default timeout.
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Create from environment variables.
    ///
    /// Uses `SALES_SQL_MODEL` for model (default: `models/gemini-2.0-flash-lite`)
    /// Uses `GOOGLE_API_KEY` (or `Google_API_KEY`), `ANTHROPIC_API_KEY`, or
    /// `OPENAI_API_KEY` based on model
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::ConfigError` if the key variable is not set
    pub fn from_env() -> Result<Self> {
        let model = std::env::var(MODEL_ENV).unwrap_or_else(|_| default_model());
        let mut config = Self::new(model, String::new());
        config.fill_key_from_env()?;
        Ok(config)
    }

    /// Fill `api_key` from the provider's environment variable if it is empty.
    pub fn fill_key_from_env(&mut self) -> Result<()> {
        if !self.api_key.is_empty() {
            return Ok(());
        }

        let vars = self.provider().key_vars();
        self.api_key = vars
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            .ok_or_else(|| {
                AssistantError::config(format!(
                    "{} environment variable not set",
                    vars[0]
                ))
            })?;
        Ok(())
    }

    pub fn provider(&self) -> LlmProvider {
        LlmProvider::from_model(&self.model)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Table the questions are about
    #[serde(default = "default_table")]
    pub table: String,

    /// How long a statement waits on a locked database
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Reject mutating statements and open the store read-only for queries
    #[serde(default)]
    pub reject_mutations: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("sales_data.db")
}

fn default_table() -> String {
    SALES_TABLE.to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            table: default_table(),
            busy_timeout_ms: default_busy_timeout_ms(),
            reject_mutations: false,
        }
    }
}

impl StoreConfig {
    /// Config for a database file with defaults for everything else.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// `~` and environment variables in the database path are expanded.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::ConfigError` if the file is not valid config JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| AssistantError::config(format!("Invalid config {}: {}", path.display(), e)))?;
        config.store.path = expand_path(&config.store.path)?;
        Ok(config)
    }
}

/// Expand `~` and `$VARS` in a path.
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .map_err(|e| AssistantError::config(format!("Cannot expand path {}: {}", raw, e)))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.llm.model, DEFAULT_MODEL);
        assert_eq!(config.llm.provider(), LlmProvider::Gemini);
        assert_eq!(config.store.table, "sales_data");
        assert_eq!(config.store.path, PathBuf::from("sales_data.db"));
        assert!(!config.store.reject_mutations);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = LlmConfig::new("gpt-4.1", "sk-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("config.json");
        fs::write(
            &file,
            r#"{"llm": {"model": "claude-sonnet-4-5", "api_key": "k"}, "store": {"reject_mutations": true}}"#,
        )
        .unwrap();

        let config = Config::load(&file).unwrap();
        assert_eq!(config.llm.provider(), LlmProvider::Anthropic);
        assert_eq!(config.llm.timeout_secs, 30);
        assert!(config.store.reject_mutations);
        assert_eq!(config.store.table, "sales_data");
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("config.json");
        fs::write(&file, "not json").unwrap();

        assert!(matches!(
            Config::load(&file),
            Err(AssistantError::ConfigError(_))
        ));
    }

    #[test]
    fn test_explicit_key_not_overwritten() {
        let mut config = LlmConfig::new("gpt-4.1", "explicit");
        config.fill_key_from_env().unwrap();
        assert_eq!(config.api_key, "explicit");
    }
}
