//! Core `StoryGenerator` trait and its HTTP implementations.
//!
//! * [`GeminiGenerator`] calls Google's `generateContent` endpoint.
//! * [`OpenAiGenerator`] calls any OpenAI-compatible `/v1/chat/completions`
//!   endpoint (OpenAI, Groq, Ollama in OpenAI mode, LM Studio, vLLM …).
//!
//! Both take every connection detail from [`StoryConfig`] and pass the
//! configured temperature through unchanged (0.0 by default).

use async_trait::async_trait;
use thiserror::Error;

use crate::config::StoryConfig;

// ---------------------------------------------------------------------------
// GenerationError
// ---------------------------------------------------------------------------

/// Errors that can occur during story generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("story request timed out")]
    Timeout,

    /// The backend answered with a non-success status (auth, quota, model).
    #[error("story backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as JSON.
    #[error("failed to parse story response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// StoryGenerator trait
// ---------------------------------------------------------------------------

/// Async trait for text-generation backends.
///
/// `generate` receives the fully rendered prompt and returns the raw content
/// field of the response.  A response without content is `Ok("")`.
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

fn build_client(config: &StoryConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, GenerationError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GenerationError::Status {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json()
        .await
        .map_err(|e| GenerationError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// GeminiGenerator
// ---------------------------------------------------------------------------

/// Calls `{base_url}/v1beta/models/{model}:generateContent`.
pub struct GeminiGenerator {
    client: reqwest::Client,
    config: StoryConfig,
}

impl GeminiGenerator {
    pub fn from_config(config: &StoryConfig) -> Self {
        Self {
            client: build_client(config),
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [
                { "role": "user", "parts": [ { "text": prompt } ] }
            ],
            "generationConfig": { "temperature": self.config.temperature }
        })
    }
}

#[async_trait]
impl StoryGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut req = self.client.post(self.endpoint()).json(&self.request_body(prompt));

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.header("x-goog-api-key", key);
        }

        let json = read_json(req.send().await?).await?;
        Ok(gemini_text(&json))
    }
}

/// Concatenate the text parts of the first candidate.
pub(crate) fn gemini_text(json: &serde_json::Value) -> String {
    json["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// OpenAiGenerator
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// The `Authorization: Bearer …` header is attached only when
/// `config.api_key` is a non-empty string, so local providers work unchanged.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    config: StoryConfig,
}

impl OpenAiGenerator {
    pub fn from_config(config: &StoryConfig) -> Self {
        Self {
            client: build_client(config),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl StoryGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "stream":      false,
            "temperature": self.config.temperature
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let json = read_json(req.send().await?).await?;
        Ok(json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
