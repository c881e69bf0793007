//! Core `SpeechBackend` trait and `HfSpeechSynthesizer` implementation.
//!
//! The backend accepts text and a fixed model id only.  The Kokoro endpoint
//! rejects a voice parameter, so none is sent or configurable.
//!
//! | Provider      | Route                                    | Body            |
//! |---------------|------------------------------------------|-----------------|
//! | `FalAi`       | `{base_url}/fal-ai/{fal_model}`          | `{"text": …}`   |
//! | `HfInference` | `{base_url}/hf-inference/models/{model}` | `{"inputs": …}` |

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{SpeechConfig, SpeechProvider};

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors that can occur during speech synthesis.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// No token is configured; raised before any network call.
    #[error("speech token not found; set HF_TOKEN or HUGGINGFACE_API_TOKEN")]
    MissingCredential,

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("speech request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("speech backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// A JSON reply did not have the expected shape.
    #[error("failed to parse speech response: {0}")]
    Parse(String),
}

impl SpeechError {
    /// `true` for the configuration error, `false` for runtime faults.
    pub fn is_configuration(&self) -> bool {
        matches!(self, SpeechError::MissingCredential)
    }
}

impl From<reqwest::Error> for SpeechError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SpeechError::Timeout
        } else {
            SpeechError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechBackend trait
// ---------------------------------------------------------------------------

/// Async trait for text-to-speech backends.
///
/// Returns the raw payload; size validation happens in
/// [`speak`](crate::speech::speak).
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;
}

// ---------------------------------------------------------------------------
// HfSpeechSynthesizer
// ---------------------------------------------------------------------------

/// Calls the Hugging Face router for the configured [`SpeechProvider`].
///
/// A binary reply is the audio.  fal.ai instead answers with JSON pointing
/// at the rendered file (`{"audio": {"url": …}}`); that URL is then fetched
/// with the same client.
pub struct HfSpeechSynthesizer {
    client: reqwest::Client,
    config: SpeechConfig,
    token: String,
}

impl HfSpeechSynthesizer {
    /// Build a synthesizer, or `None` when no token is configured.
    ///
    /// Returning `None` instead of failing lets the process start without a
    /// token; the error surfaces on the first [`speak`](crate::speech::speak).
    pub fn from_config(config: &SpeechConfig) -> Option<Self> {
        let token = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Some(Self {
            client,
            config: config.clone(),
            token,
        })
    }

    fn endpoint(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        match self.config.provider {
            SpeechProvider::FalAi => format!("{base}/fal-ai/{}", self.config.fal_model),
            SpeechProvider::HfInference => {
                format!("{base}/hf-inference/models/{}", self.config.model)
            }
        }
    }

    fn request_body(&self, text: &str) -> serde_json::Value {
        match self.config.provider {
            SpeechProvider::FalAi => serde_json::json!({ "text": text }),
            SpeechProvider::HfInference => serde_json::json!({ "inputs": text }),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SpeechError> {
        log::debug!("speech: fetching rendered audio from {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl SpeechBackend for HfSpeechSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let url = self.endpoint();
        log::debug!("speech: POST {url} ({} chars)", text.chars().count());

        let body = self.request_body(text);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));

        let payload = response.bytes().await?;

        if is_json {
            let audio_url = audio_url(&payload)?;
            return self.fetch(&audio_url).await;
        }

        Ok(payload.to_vec())
    }
}

/// Extract the rendered-audio URL from a router JSON reply.
pub(crate) fn audio_url(body: &[u8]) -> Result<String, SpeechError> {
    #[derive(Deserialize)]
    struct AudioRef {
        url: String,
    }

    #[derive(Deserialize)]
    struct RouterReply {
        audio: AudioRef,
    }

    serde_json::from_slice::<RouterReply>(body)
        .map(|r| r.audio.url)
        .map_err(|e| SpeechError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
