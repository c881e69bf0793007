//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{AppPaths, Credentials};

/// Responses shorter than this many bytes are treated as "no audio produced".
pub const DEFAULT_MIN_AUDIO_BYTES: usize = 100;

// ---------------------------------------------------------------------------
// StoryProvider
// ---------------------------------------------------------------------------

/// Selects which text-generation backend writes the story.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StoryProvider {
    /// Google Gemini `generateContent` API.
    Gemini,
    /// Any OpenAI-compatible REST API (OpenAI, Groq, Ollama, LM Studio …).
    OpenAiCompatible,
}

impl Default for StoryProvider {
    fn default() -> Self {
        Self::Gemini
    }
}

// ---------------------------------------------------------------------------
// CaptionConfig
// ---------------------------------------------------------------------------

/// Settings for the vision-to-text captioning backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Base URL of the inference endpoint; the model id is appended as
    /// `{base_url}/models/{model}`.
    pub base_url: String,
    /// Captioning model identifier.
    pub model: String,
    /// Bearer token.  Optional: attached only when present.
    pub api_key: Option<String>,
    /// Maximum seconds to wait for a caption before timing out.
    pub timeout_secs: u64,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.huggingface.co/hf-inference".into(),
            model: "Salesforce/blip-image-captioning-large".into(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// StoryConfig
// ---------------------------------------------------------------------------

/// Settings for the narrative (text-generation) step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    /// Which backend to use.
    pub provider: StoryProvider,
    /// Base URL of the API endpoint.
    ///
    /// - Gemini: `https://generativelanguage.googleapis.com`
    /// - OpenAI: `https://api.openai.com`
    pub base_url: String,
    /// API key.  Usually supplied through the environment, not the file.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"gemini-2.5-flash"`).
    pub model: String,
    /// Sampling temperature.  `0.0` asks for greedy, repeatable output.
    pub temperature: f32,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            provider: StoryProvider::default(),
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: None,
            model: "gemini-2.5-flash".into(),
            temperature: 0.0,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Which Hugging Face inference provider serves the speech model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpeechProvider {
    /// fal.ai behind the router: `{base_url}/fal-ai/{fal model id}` with
    /// `{"text": …}`, answered by `{"audio": {"url": …}}`.
    FalAi,
    /// Hugging Face's own serverless inference:
    /// `{base_url}/hf-inference/models/{model}` with `{"inputs": …}`.
    HfInference,
}

impl Default for SpeechProvider {
    fn default() -> Self {
        Self::FalAi
    }
}

/// Settings for the text-to-speech backend.
///
/// There is deliberately no voice option: the Kokoro endpoint rejects one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Which provider route to call.
    pub provider: SpeechProvider,
    /// Router base URL; the provider route is appended to it.
    pub base_url: String,
    /// Hub model identifier.
    pub model: String,
    /// Provider-side model id for [`SpeechProvider::FalAi`].
    pub fal_model: String,
    /// Bearer token.  `None` means speech is unavailable until one is set.
    pub api_key: Option<String>,
    /// Payloads below this size are reported as "no audio produced".
    pub min_audio_bytes: usize,
    /// Maximum seconds to wait for synthesis before timing out.
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            provider: SpeechProvider::default(),
            base_url: "https://router.huggingface.co".into(),
            model: "hexgrad/Kokoro-82M".into(),
            fal_model: "fal-ai/kokoro/american-english".into(),
            api_key: None,
            min_audio_bytes: DEFAULT_MIN_AUDIO_BYTES,
            timeout_secs: 120,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use img2speech::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Vision-to-text settings.
    pub caption: CaptionConfig,
    /// Story generation settings.
    pub story: StoryConfig,
    /// Speech synthesis settings.
    pub speech: SpeechConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// so callers never need to special-case a missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (`--config`, tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overlay credentials found in the environment.
    ///
    /// Environment values win over keys stored in the file; keys absent from
    /// the environment leave the file value untouched.
    pub fn with_credentials(mut self, creds: &Credentials) -> Self {
        let story_key = match self.story.provider {
            StoryProvider::Gemini => creds.google_api_key.as_ref(),
            StoryProvider::OpenAiCompatible => creds.openai_api_key.as_ref(),
        };
        if let Some(key) = story_key {
            self.story.api_key = Some(key.clone());
        }
        if let Some(token) = &creds.hf_token {
            self.caption.api_key = Some(token.clone());
            self.speech.api_key = Some(token.clone());
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
