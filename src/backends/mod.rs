//! Process-wide backend handles.
//!
//! [`Backends`] is the long-lived service object built once at startup and
//! passed by reference into every pipeline run.  Each backend is constructed
//! lazily on first use and then reused for the life of the holder:
//!
//! ```text
//! Backends
//!   ├─ caption: OnceLock<Arc<dyn CaptionBackend>>
//!   ├─ story:   OnceLock<Arc<dyn StoryGenerator>>
//!   └─ speech:  OnceLock<Option<Arc<dyn SpeechBackend>>>   (None = no token)
//! ```
//!
//! Construction is delegated to a [`BackendFactory`].  Backend kinds are
//! chosen by configuration inside the factory, never by inspecting types.

use std::sync::{Arc, OnceLock};

use crate::caption::{CaptionBackend, HfCaptioner};
use crate::config::{AppConfig, StoryProvider};
use crate::speech::{HfSpeechSynthesizer, SpeechBackend};
use crate::story::{GeminiGenerator, OpenAiGenerator, StoryGenerator};

// ---------------------------------------------------------------------------
// BackendFactory
// ---------------------------------------------------------------------------

/// Builds the concrete backend for each stage.
///
/// Each method is called at most once per [`Backends`] holder.
pub trait BackendFactory: Send + Sync {
    fn caption(&self) -> Arc<dyn CaptionBackend>;
    fn story(&self) -> Arc<dyn StoryGenerator>;
    /// `None` when the speech backend has no credential.
    fn speech(&self) -> Option<Arc<dyn SpeechBackend>>;
}

/// Builds the HTTP backends described by an [`AppConfig`].
pub struct HttpBackendFactory {
    config: AppConfig,
}

impl HttpBackendFactory {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

impl BackendFactory for HttpBackendFactory {
    fn caption(&self) -> Arc<dyn CaptionBackend> {
        log::info!("backends: caption model {}", self.config.caption.model);
        Arc::new(HfCaptioner::from_config(&self.config.caption))
    }

    fn story(&self) -> Arc<dyn StoryGenerator> {
        let story = &self.config.story;
        log::info!("backends: story model {} ({:?})", story.model, story.provider);
        match story.provider {
            StoryProvider::Gemini => Arc::new(GeminiGenerator::from_config(story)),
            StoryProvider::OpenAiCompatible => Arc::new(OpenAiGenerator::from_config(story)),
        }
    }

    fn speech(&self) -> Option<Arc<dyn SpeechBackend>> {
        match HfSpeechSynthesizer::from_config(&self.config.speech) {
            Some(synth) => {
                log::info!("backends: speech model {}", self.config.speech.model);
                Some(Arc::new(synth))
            }
            None => {
                log::warn!("backends: no speech token configured; speech is unavailable");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

/// Initialise-once holder for the three backend handles.
///
/// Thread-safe: concurrent first accesses still build each backend once.
pub struct Backends {
    factory: Box<dyn BackendFactory>,
    caption: OnceLock<Arc<dyn CaptionBackend>>,
    story: OnceLock<Arc<dyn StoryGenerator>>,
    speech: OnceLock<Option<Arc<dyn SpeechBackend>>>,
}

impl Backends {
    pub fn new(factory: impl BackendFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            caption: OnceLock::new(),
            story: OnceLock::new(),
            speech: OnceLock::new(),
        }
    }

    /// Holder backed by the HTTP backends in `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(HttpBackendFactory::new(config.clone()))
    }

    pub fn caption(&self) -> &dyn CaptionBackend {
        self.caption.get_or_init(|| self.factory.caption()).as_ref()
    }

    pub fn story(&self) -> &dyn StoryGenerator {
        self.story.get_or_init(|| self.factory.story()).as_ref()
    }

    /// The speech backend, or `None` when no credential was configured.
    pub fn speech(&self) -> Option<&dyn SpeechBackend> {
        self.speech
            .get_or_init(|| self.factory.speech())
            .as_deref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
