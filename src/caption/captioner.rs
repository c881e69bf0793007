//! Core `CaptionBackend` trait and `HfCaptioner` implementation.
//!
//! `HfCaptioner` posts the raw image bytes to a Hugging Face style
//! image-to-text endpoint (`{base_url}/models/{model}`) and returns the
//! candidate list the model produced.  All connection details come from
//! [`CaptionConfig`].

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::CaptionConfig;
use crate::input::ImageInput;

// ---------------------------------------------------------------------------
// CaptionError
// ---------------------------------------------------------------------------

/// Errors that can occur while captioning an image.
#[derive(Debug, Error)]
pub enum CaptionError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("caption request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("caption backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected candidate list.
    #[error("failed to parse caption response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for CaptionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CaptionError::Timeout
        } else {
            CaptionError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// CaptionCandidate
// ---------------------------------------------------------------------------

/// One caption hypothesis returned by the vision model.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CaptionCandidate {
    #[serde(default)]
    pub generated_text: String,
}

// ---------------------------------------------------------------------------
// CaptionBackend trait
// ---------------------------------------------------------------------------

/// Async trait for vision-to-text backends.
///
/// Implementors must be `Send + Sync` so they can be shared behind
/// `Arc<dyn CaptionBackend>`.  An empty candidate list is a valid answer.
#[async_trait]
pub trait CaptionBackend: Send + Sync {
    async fn describe(&self, image: &ImageInput) -> Result<Vec<CaptionCandidate>, CaptionError>;
}

// ---------------------------------------------------------------------------
// HfCaptioner
// ---------------------------------------------------------------------------

/// Calls an image-to-text inference endpoint with the raw image as body.
pub struct HfCaptioner {
    client: reqwest::Client,
    config: CaptionConfig,
}

impl HfCaptioner {
    /// Build an `HfCaptioner` from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; a default client is used if the builder fails.
    pub fn from_config(config: &CaptionConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl CaptionBackend for HfCaptioner {
    async fn describe(&self, image: &ImageInput) -> Result<Vec<CaptionCandidate>, CaptionError> {
        let url = self.endpoint();
        log::debug!(
            "caption: POST {url} ({} bytes, {})",
            image.len(),
            image.mime_type()
        );

        let mut req = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, image.mime_type())
            .body(image.bytes().to_vec());

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CaptionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        parse_candidates(&body)
    }
}

/// Parse an image-to-text response body.
///
/// Accepts either a list of candidates or a single candidate object.
pub(crate) fn parse_candidates(body: &str) -> Result<Vec<CaptionCandidate>, CaptionError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        Many(Vec<CaptionCandidate>),
        One(CaptionCandidate),
    }

    match serde_json::from_str::<Shape>(body) {
        Ok(Shape::Many(list)) => Ok(list),
        Ok(Shape::One(single)) => Ok(vec![single]),
        Err(e) => Err(CaptionError::Parse(e.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
