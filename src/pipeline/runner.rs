//! Pipeline runner — drives caption → story → speech for one image.
//!
//! # Pipeline flow
//!
//! ```text
//! ImageInput
//!   └─▶ caption(image)      [Captioning]  ── Err → halt, report Caption failure
//!         └─▶ narrate(text) [Narrating]   ── Err → halt, report Story failure
//!               └─▶ speak   [Speaking]    ── Err → report Speech failure
//!                     └─▶ Audio | NoAudio [Done]
//! ```
//!
//! Stages run strictly one after another; nothing is retried and nothing
//! runs after a failure.  The [`PipelineReport`] carries whatever was
//! produced before the failing stage plus the failure itself.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::backends::Backends;
use crate::caption::{self, CaptionError};
use crate::config::AppConfig;
use crate::input::ImageInput;
use crate::speech::{self, AudioResult, SpeechError};
use crate::story::{self, GenerationError, StoryPrompt};

use super::state::{PipelineState, Stage};

// ---------------------------------------------------------------------------
// StageError / StageFailure
// ---------------------------------------------------------------------------

/// Error raised by one stage, preserving the stage's own error type.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Caption(#[from] CaptionError),
    #[error(transparent)]
    Story(#[from] GenerationError),
    #[error(transparent)]
    Speech(#[from] SpeechError),
}

impl StageError {
    /// `true` for configuration problems (missing credential) as opposed to
    /// backend faults.
    pub fn is_configuration(&self) -> bool {
        match self {
            StageError::Speech(e) => e.is_configuration(),
            StageError::Caption(_) | StageError::Story(_) => false,
        }
    }
}

/// Which stage failed, and why.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {error}")]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub error: StageError,
}

impl StageFailure {
    fn new(stage: Stage, error: impl Into<StageError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineReport / PipelineEvent
// ---------------------------------------------------------------------------

/// Everything one run produced.
///
/// Fields are `None` for stages that failed or never ran.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub caption: Option<String>,
    pub story: Option<String>,
    pub audio: Option<AudioResult>,
    pub failure: Option<StageFailure>,
}

impl PipelineReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Terminal state of the run.
    pub fn state(&self) -> PipelineState {
        if self.failure.is_some() {
            PipelineState::Error
        } else {
            PipelineState::Done
        }
    }

    pub fn failed_stage(&self) -> Option<Stage> {
        self.failure.as_ref().map(|f| f.stage)
    }
}

/// Progress events for incremental rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A stage is about to run.
    Started(Stage),
    CaptionReady(String),
    StoryReady(String),
    AudioReady(AudioResult),
    /// A stage failed; no further events follow.
    Failed { stage: Stage, message: String },
}

// ---------------------------------------------------------------------------
// PipelineRunner
// ---------------------------------------------------------------------------

/// Exposes the three stage entry points and the end-to-end run.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use img2speech::backends::Backends;
/// use img2speech::config::AppConfig;
/// use img2speech::input::ImageInput;
/// use img2speech::pipeline::PipelineRunner;
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let runner = PipelineRunner::new(Arc::new(Backends::from_config(&config)), &config);
///
/// let image = ImageInput::from_path("cat.jpg").unwrap();
/// let report = runner.run(&image).await;
/// println!("{:?}", report.story);
/// # }
/// ```
pub struct PipelineRunner {
    backends: Arc<Backends>,
    prompt: StoryPrompt,
    min_audio_bytes: usize,
}

impl PipelineRunner {
    pub fn new(backends: Arc<Backends>, config: &AppConfig) -> Self {
        Self {
            backends,
            prompt: StoryPrompt::default(),
            min_audio_bytes: config.speech.min_audio_bytes,
        }
    }

    /// Image → caption.  Empty when the model produced nothing.
    pub async fn caption(&self, image: &ImageInput) -> Result<String, CaptionError> {
        caption::caption(self.backends.caption(), image).await
    }

    /// Scenario → story.  Empty when the model produced nothing.
    pub async fn narrate(&self, scenario: &str) -> Result<String, GenerationError> {
        story::narrate(self.backends.story(), &self.prompt, scenario).await
    }

    /// Story → audio, or [`AudioResult::NoAudio`] for a degenerate reply.
    pub async fn speak(&self, text: &str) -> Result<AudioResult, SpeechError> {
        speech::speak(self.backends.speech(), text, self.min_audio_bytes).await
    }

    /// Run all three stages.
    pub async fn run(&self, image: &ImageInput) -> PipelineReport {
        self.execute(image, None).await
    }

    /// Run all three stages, emitting [`PipelineEvent`]s on `events`.
    ///
    /// A closed receiver does not stop the run.
    pub async fn run_with_events(
        &self,
        image: &ImageInput,
        events: &mpsc::Sender<PipelineEvent>,
    ) -> PipelineReport {
        self.execute(image, Some(events)).await
    }

    async fn execute(
        &self,
        image: &ImageInput,
        events: Option<&mpsc::Sender<PipelineEvent>>,
    ) -> PipelineReport {
        let mut report = PipelineReport::default();

        // ── 1. Caption ───────────────────────────────────────────────────
        emit(events, PipelineEvent::Started(Stage::Caption)).await;
        let caption = match self.caption(image).await {
            Ok(text) => text,
            Err(e) => return fail(report, events, StageFailure::new(Stage::Caption, e)).await,
        };
        report.caption = Some(caption.clone());
        emit(events, PipelineEvent::CaptionReady(caption.clone())).await;

        // ── 2. Story ─────────────────────────────────────────────────────
        emit(events, PipelineEvent::Started(Stage::Story)).await;
        let story = match self.narrate(&caption).await {
            Ok(text) => text,
            Err(e) => return fail(report, events, StageFailure::new(Stage::Story, e)).await,
        };
        report.story = Some(story.clone());
        emit(events, PipelineEvent::StoryReady(story.clone())).await;

        // ── 3. Speech ────────────────────────────────────────────────────
        emit(events, PipelineEvent::Started(Stage::Speech)).await;
        let audio = match self.speak(&story).await {
            Ok(audio) => audio,
            Err(e) => return fail(report, events, StageFailure::new(Stage::Speech, e)).await,
        };
        report.audio = Some(audio.clone());
        emit(events, PipelineEvent::AudioReady(audio)).await;

        log::debug!("pipeline: run complete");
        report
    }
}

async fn emit(events: Option<&mpsc::Sender<PipelineEvent>>, event: PipelineEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event).await;
    }
}

async fn fail(
    mut report: PipelineReport,
    events: Option<&mpsc::Sender<PipelineEvent>>,
    failure: StageFailure,
) -> PipelineReport {
    log::error!("pipeline: {failure}");
    emit(
        events,
        PipelineEvent::Failed {
            stage: failure.stage,
            message: failure.error.to_string(),
        },
    )
    .await;
    report.failure = Some(failure);
    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::BackendFactory;
    use crate::caption::{CaptionBackend, CaptionCandidate};
    use crate::speech::SpeechBackend;
    use crate::story::StoryGenerator;
    use async_trait::async_trait;
    use image::ImageFormat;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    struct StubCaption(&'static str);

    #[async_trait]
    impl CaptionBackend for StubCaption {
        async fn describe(&self, _: &ImageInput) -> Result<Vec<CaptionCandidate>, CaptionError> {
            Ok(vec![CaptionCandidate {
                generated_text: self.0.into(),
            }])
        }
    }

    struct BrokenCaption;

    #[async_trait]
    impl CaptionBackend for BrokenCaption {
        async fn describe(&self, _: &ImageInput) -> Result<Vec<CaptionCandidate>, CaptionError> {
            Err(CaptionError::Status {
                status: 401,
                body: "bad token".into(),
            })
        }
    }

    struct StubStory {
        reply: Result<&'static str, ()>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl StoryGenerator for StubStory {
        async fn generate(&self, _: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .map(String::from)
                .map_err(|()| GenerationError::Request("network unreachable".into()))
        }
    }

    struct StubSpeech {
        len: usize,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SpeechBackend for StubSpeech {
        async fn synthesize(&self, _: &str) -> Result<Vec<u8>, SpeechError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0x52; self.len])
        }
    }

    struct Factory {
        caption: Arc<dyn CaptionBackend>,
        story: Arc<dyn StoryGenerator>,
        speech: Option<Arc<dyn SpeechBackend>>,
    }

    impl BackendFactory for Factory {
        fn caption(&self) -> Arc<dyn CaptionBackend> {
            Arc::clone(&self.caption)
        }
        fn story(&self) -> Arc<dyn StoryGenerator> {
            Arc::clone(&self.story)
        }
        fn speech(&self) -> Option<Arc<dyn SpeechBackend>> {
            self.speech.clone()
        }
    }

    struct Counters {
        story: Arc<AtomicUsize>,
        speech: Arc<AtomicUsize>,
    }

    fn runner(
        caption: Arc<dyn CaptionBackend>,
        story_reply: Result<&'static str, ()>,
        speech_len: Option<usize>,
    ) -> (PipelineRunner, Counters) {
        let counters = Counters {
            story: Arc::new(AtomicUsize::new(0)),
            speech: Arc::new(AtomicUsize::new(0)),
        };
        let factory = Factory {
            caption,
            story: Arc::new(StubStory {
                reply: story_reply,
                calls: Arc::clone(&counters.story),
            }),
            speech: speech_len.map(|len| {
                Arc::new(StubSpeech {
                    len,
                    calls: Arc::clone(&counters.speech),
                }) as Arc<dyn SpeechBackend>
            }),
        };
        let runner = PipelineRunner::new(Arc::new(Backends::new(factory)), &AppConfig::default());
        (runner, counters)
    }

    fn cat_image() -> ImageInput {
        ImageInput::from_bytes(crate::input::tests::encoded(ImageFormat::Jpeg), "jpg").unwrap()
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn full_run_produces_all_outputs() {
        let (runner, counters) = runner(
            Arc::new(StubCaption("a cat sitting on a table")),
            Ok("A curious cat discovers a table."),
            Some(2000),
        );

        let report = runner.run(&cat_image()).await;

        assert!(report.is_success());
        assert_eq!(report.state(), PipelineState::Done);
        assert_eq!(report.caption.as_deref(), Some("a cat sitting on a table"));
        assert_eq!(report.story.as_deref(), Some("A curious cat discovers a table."));
        assert_eq!(
            report.audio.as_ref().and_then(AudioResult::bytes).map(<[u8]>::len),
            Some(2000)
        );
        assert_eq!(counters.story.load(Ordering::SeqCst), 1);
        assert_eq!(counters.speech.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn story_failure_skips_speech() {
        let (runner, counters) = runner(Arc::new(StubCaption("a cat")), Err(()), Some(2000));

        let report = runner.run(&cat_image()).await;

        assert_eq!(report.state(), PipelineState::Error);
        assert_eq!(report.caption.as_deref(), Some("a cat"));
        assert!(report.story.is_none());
        assert!(report.audio.is_none());
        assert_eq!(report.failed_stage(), Some(Stage::Story));
        let failure = report.failure.as_ref().unwrap();
        assert!(failure.to_string().contains("network unreachable"));
        assert_eq!(counters.speech.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn caption_failure_skips_everything_else() {
        let (runner, counters) = runner(Arc::new(BrokenCaption), Ok("never"), Some(2000));

        let report = runner.run(&cat_image()).await;

        assert_eq!(report.failed_stage(), Some(Stage::Caption));
        assert!(report.caption.is_none());
        assert_eq!(counters.story.load(Ordering::SeqCst), 0);
        assert_eq!(counters.speech.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_speech_credential_is_configuration_failure() {
        let (runner, _) = runner(Arc::new(StubCaption("a cat")), Ok("A story."), None);

        let report = runner.run(&cat_image()).await;

        assert_eq!(report.failed_stage(), Some(Stage::Speech));
        assert_eq!(report.story.as_deref(), Some("A story."));
        assert!(report.failure.as_ref().unwrap().error.is_configuration());
    }

    #[tokio::test]
    async fn tiny_audio_is_reported_as_no_audio() {
        let (runner, _) = runner(Arc::new(StubCaption("a cat")), Ok("A story."), Some(10));

        let report = runner.run(&cat_image()).await;

        assert!(report.is_success());
        assert_eq!(report.audio, Some(AudioResult::NoAudio));
    }

    #[tokio::test]
    async fn empty_caption_still_flows_to_story() {
        let (runner, counters) = runner(Arc::new(StubCaption("")), Ok("A story."), Some(500));

        let report = runner.run(&cat_image()).await;

        assert_eq!(report.caption.as_deref(), Some(""));
        assert_eq!(counters.story.load(Ordering::SeqCst), 1);
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn events_follow_stage_order() {
        let (runner, _) = runner(Arc::new(StubCaption("a cat")), Ok("A story."), Some(500));
        let (tx, mut rx) = mpsc::channel(16);

        runner.run_with_events(&cat_image(), &tx).await;
        drop(tx);

        let mut events = Vec::new();
        while let Some(e) = rx.recv().await {
            events.push(e);
        }

        assert_eq!(events.len(), 6);
        assert_eq!(events[0], PipelineEvent::Started(Stage::Caption));
        assert_eq!(events[1], PipelineEvent::CaptionReady("a cat".into()));
        assert_eq!(events[2], PipelineEvent::Started(Stage::Story));
        assert_eq!(events[3], PipelineEvent::StoryReady("A story.".into()));
        assert_eq!(events[4], PipelineEvent::Started(Stage::Speech));
        assert!(matches!(events[5], PipelineEvent::AudioReady(AudioResult::Audio(_))));
    }

    #[tokio::test]
    async fn failure_event_is_last() {
        let (runner, _) = runner(Arc::new(StubCaption("a cat")), Err(()), Some(500));
        let (tx, mut rx) = mpsc::channel(16);

        runner.run_with_events(&cat_image(), &tx).await;
        drop(tx);

        let mut last = None;
        while let Some(e) = rx.recv().await {
            last = Some(e);
        }
        assert!(matches!(
            last,
            Some(PipelineEvent::Failed { stage: Stage::Story, .. })
        ));
    }

    #[tokio::test]
    async fn closed_receiver_does_not_stop_run() {
        let (runner, _) = runner(Arc::new(StubCaption("a cat")), Ok("A story."), Some(500));
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let report = runner.run_with_events(&cat_image(), &tx).await;
        assert!(report.is_success());
    }
}
