//! Narrative stage: caption (scenario) → short story.
//!
//! This module provides:
//! * [`StoryGenerator`] — async trait implemented by text-generation backends.
//! * [`GeminiGenerator`] / [`OpenAiGenerator`] — HTTP backends.
//! * [`StoryPrompt`] — the fixed storyteller template.
//! * [`narrate`] — the stage function used by the pipeline.
//! * [`GenerationError`] — error variants for generation.

pub mod generator;
pub mod prompt;

pub use generator::{GeminiGenerator, GenerationError, OpenAiGenerator, StoryGenerator};
pub use prompt::{word_count, StoryPrompt, STORY_WORD_LIMIT};

/// Turn `scenario` into a short story.
///
/// The result is trimmed; an empty generation comes back as `""`.  Stories
/// longer than [`STORY_WORD_LIMIT`] are logged and returned as-is.
pub async fn narrate(
    generator: &dyn StoryGenerator,
    prompt: &StoryPrompt,
    scenario: &str,
) -> Result<String, GenerationError> {
    let rendered = prompt.render(scenario);
    let story = generator.generate(&rendered).await?.trim().to_string();

    let words = word_count(&story);
    if story.is_empty() {
        log::warn!("story: backend returned an empty story");
    } else if words > STORY_WORD_LIMIT {
        log::warn!("story: {words} words, above the requested {STORY_WORD_LIMIT}");
    } else {
        log::info!("story: {words} words");
    }

    Ok(story)
}
