//! Story prompt template.
//!
//! The template has exactly one slot, `{scenario}`, which receives the image
//! caption.  The word cap is an instruction to the model only; nothing here
//! or downstream truncates the result.

/// Soft length limit the prompt asks the model to respect.
pub const STORY_WORD_LIMIT: usize = 50;

const SCENARIO_SLOT: &str = "{scenario}";

const STORY_TEMPLATE: &str = "\
You are a creative storyteller who can craft engaging and imaginative stories from simple narrative.
Create a story using the scenario provided; the story should have maximum of 50 words.
Scenario: {scenario}
Story:
";

/// Renders the fixed storyteller prompt.
///
/// # Example
/// ```rust
/// use img2speech::story::StoryPrompt;
///
/// let prompt = StoryPrompt::default().render("a cat on a table");
/// assert!(prompt.contains("Scenario: a cat on a table"));
/// ```
#[derive(Debug, Clone)]
pub struct StoryPrompt {
    template: &'static str,
}

impl Default for StoryPrompt {
    fn default() -> Self {
        Self {
            template: STORY_TEMPLATE,
        }
    }
}

impl StoryPrompt {
    /// Substitute `scenario` into the template.
    ///
    /// The scenario is inserted verbatim; braces inside it are not treated
    /// as further slots.
    pub fn render(&self, scenario: &str) -> String {
        self.template.replacen(SCENARIO_SLOT, scenario, 1)
    }
}

/// Whitespace-separated word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
