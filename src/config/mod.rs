//! Configuration module for img2speech.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each stage,
//! `AppPaths` for cross-platform directories, `Credentials` for tokens read
//! from the environment, and TOML persistence via `AppConfig::load_from` /
//! `AppConfig::save_to`.

pub mod credentials;
pub mod paths;
pub mod settings;

pub use credentials::Credentials;
pub use paths::AppPaths;
pub use settings::{
    AppConfig, CaptionConfig, SpeechConfig, SpeechProvider, StoryConfig, StoryProvider,
    DEFAULT_MIN_AUDIO_BYTES,
};
