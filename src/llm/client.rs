//! HTTP client for hosted LLM APIs.

use crate::config::LlmConfig;
use crate::llm::provider::TextGenerator;
use crate::types::{AssistantError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Gemini,
    OpenAI,
    Anthropic,
}

impl LlmProvider {
    /// Pick the provider from a model name.
    ///
    /// - `gemini-*`, `models/gemini-*` → Gemini
    /// - `claude-*`, `anthropic*` → Anthropic
    /// - anything else → OpenAI-compatible
    pub fn from_model(model: &str) -> Self {
        let name = model.strip_prefix("models/").unwrap_or(model);
        if name.starts_with("gemini") {
            Self::Gemini
        } else if name.starts_with("claude") || name.starts_with("anthropic") {
            Self::Anthropic
        } else {
            Self::OpenAI
        }
    }

    /// Environment variables holding this provider's key, in lookup order.
    pub fn key_vars(&self) -> &'static [&'static str] {
        match self {
            Self::Gemini => &["GOOGLE_API_KEY", "Google_API_KEY"],
            Self::OpenAI => &["OPENAI_API_KEY"],
            Self::Anthropic => &["ANTHROPIC_API_KEY"],
        }
    }

    pub fn default_base(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::OpenAI => "https://api.openai.com",
            Self::Anthropic => "https://api.anthropic.com",
        }
    }
}

/// Gemini `generateContent` response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

/// OpenAI chat completion response.
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

/// Anthropic API response.
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: Option<String>,
}

/// Text generator backed by a hosted LLM API.
pub struct LlmClient {
    config: LlmConfig,
    provider: LlmProvider,
    client: Client,
}

impl LlmClient {
    /// Create a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::ConfigError` if the API key is empty, or
    /// `AssistantError::HttpError` if the HTTP client cannot be built
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AssistantError::config(format!(
                "No API key configured for model {}",
                config.model
            )));
        }

        let client = Client::builder().timeout(config.timeout()).build()?;
        let provider = config.provider();

        Ok(Self {
            config,
            provider,
            client,
        })
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    /// Full request URL for the configured provider and model.
    pub fn endpoint(&self) -> String {
        let base = self
            .config
            .api_base
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base())
            .trim_end_matches('/');

        match self.provider {
            LlmProvider::Gemini => {
                let model = if self.config.model.starts_with("models/") {
                    self.config.model.clone()
                } else {
                    format!("models/{}", self.config.model)
                };
                format!("{}/v1beta/{}:generateContent", base, model)
            }
            LlmProvider::OpenAI => format!("{}/v1/chat/completions", base),
            LlmProvider::Anthropic => format!("{}/v1/messages", base),
        }
    }

    /// POST a JSON body and return the response text, failing on non-2xx.
    async fn post(&self, name: &str, request: reqwest::RequestBuilder, body: JsonValue) -> Result<String> {
        let response = request
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::llm(format!("{} API error: {}", name, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::llm(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(AssistantError::llm(format!("{} API error {}: {}", name, status, body)));
        }

        Ok(body)
    }

    /// Call Gemini API. Instructions and question go as two parts of one turn.
    async fn call_gemini(&self, instructions: &str, question: &str) -> Result<String> {
        let request = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key);

        let body = self
            .post(
                "Gemini",
                request,
                json!({
                    "contents": [{
                        "role": "user",
                        "parts": [{"text": instructions}, {"text": question}]
                    }],
                    "generationConfig": {"temperature": 0.1}
                }),
            )
            .await?;

        Self::parse_gemini(&body)
    }

    /// Call OpenAI API.
    async fn call_openai(&self, instructions: &str, question: &str) -> Result<String> {
        let request = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key));

        let body = self
            .post(
                "OpenAI",
                request,
                json!({
                    "model": self.config.model,
                    "messages": [
                        {"role": "system", "content": instructions},
                        {"role": "user", "content": question}
                    ],
                    "temperature": 0.1
                }),
            )
            .await?;

        Self::parse_openai(&body)
    }

    /// Call Anthropic API.
    async fn call_anthropic(&self, instructions: &str, question: &str) -> Result<String> {
        let request = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01");

        let body = self
            .post(
                "Anthropic",
                request,
                json!({
                    "model": self.config.model,
                    "max_tokens": 1024,
                    "system": instructions,
                    "messages": [
                        {"role": "user", "content": question}
                    ],
                    "temperature": 0.1
                }),
            )
            .await?;

        Self::parse_anthropic(&body)
    }

    fn parse_gemini(body: &str) -> Result<String> {
        let parsed: GeminiResponse = serde_json::from_str(body)
            .map_err(|e| AssistantError::llm(format!("Failed to parse Gemini response: {}", e)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or_else(|| AssistantError::llm("No response from Gemini"))?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        Ok(text)
    }

    fn parse_openai(body: &str) -> Result<String> {
        let parsed: OpenAIResponse = serde_json::from_str(body)
            .map_err(|e| AssistantError::llm(format!("Failed to parse OpenAI response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AssistantError::llm("No response from OpenAI"))
            .map(|c| c.message.content.unwrap_or_default())
    }

    fn parse_anthropic(body: &str) -> Result<String> {
        let parsed: AnthropicResponse = serde_json::from_str(body)
            .map_err(|e| AssistantError::llm(format!("Failed to parse Anthropic response: {}", e)))?;

        if parsed.content.is_empty() {
            return Err(AssistantError::llm("No response from Anthropic"));
        }

        Ok(parsed.content.into_iter().filter_map(|c| c.text).collect())
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, instructions: &str, question: &str) -> Result<String> {
        tracing::debug!(model = %self.config.model, provider = ?self.provider, "Calling LLM");

        let text = match self.provider {
            LlmProvider::Gemini => self.call_gemini(instructions, question).await?,
            LlmProvider::OpenAI => self.call_openai(instructions, question).await?,
            LlmProvider::Anthropic => self.call_anthropic(instructions, question).await?,
        };

        tracing::debug!(response = %text, "LLM raw response");
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(model: &str) -> LlmClient {
        LlmClient::new(LlmConfig::new(model, "test-key")).unwrap()
    }

    #[test]
    fn test_provider_detection() {
        assert_eq!(LlmProvider::from_model("models/gemini-2.0-flash-lite"), LlmProvider::Gemini);
        assert_eq!(LlmProvider::from_model("gemini-1.5-pro"), LlmProvider::Gemini);
        assert_eq!(LlmProvider::from_model("claude-haiku-4-5"), LlmProvider::Anthropic);
        assert_eq!(LlmProvider::from_model("gpt-4.1"), LlmProvider::OpenAI);
        assert_eq!(client("claude-haiku-4-5").provider(), LlmProvider::Anthropic);
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(
            client("models/gemini-2.0-flash-lite").endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-lite:generateContent"
        );
        assert_eq!(
            client("gemini-1.5-pro").endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
        assert_eq!(client("gpt-4.1").endpoint(), "https://api.openai.com/v1/chat/completions");

        let mut config = LlmConfig::new("claude-haiku-4-5", "k");
        config.api_base = Some("http://localhost:8080/".to_string());
        assert_eq!(
            LlmClient::new(config).unwrap().endpoint(),
            "http://localhost:8080/v1/messages"
        );
    }

    #[test]
    fn test_missing_key_rejected() {
        let result = LlmClient::new(LlmConfig::new("gpt-4.1", "  "));
        assert!(matches!(result, Err(AssistantError::ConfigError(_))));
    }

    #[test]
    fn test_parse_gemini() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"SELECT "},{"text":"1"}],"role":"model"}}]}"#;
        assert_eq!(LlmClient::parse_gemini(body).unwrap(), "SELECT 1");

        let blocked = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert!(LlmClient::parse_gemini(blocked).is_err());
    }

    #[test]
    fn test_parse_openai_and_anthropic() {
        let openai = r#"{"choices":[{"message":{"role":"assistant","content":"SELECT 2"}}]}"#;
        assert_eq!(LlmClient::parse_openai(openai).unwrap(), "SELECT 2");

        let anthropic = r#"{"content":[{"type":"text","text":"SELECT 3"}]}"#;
        assert_eq!(LlmClient::parse_anthropic(anthropic).unwrap(), "SELECT 3");

        assert!(LlmClient::parse_openai(r#"{"choices":[]}"#).is_err());
        assert!(LlmClient::parse_anthropic("garbage").is_err());
    }
}
