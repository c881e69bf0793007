//! Pipeline stages and the progress state machine.
//!
//! [`Stage`] names the three steps; [`PipelineState`] is what a presentation
//! layer shows while a run is in flight.

use std::fmt;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// The three pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Caption,
    Story,
    Speech,
}

impl Stage {
    /// The state a run is in while this stage executes.
    pub fn running_state(self) -> PipelineState {
        match self {
            Stage::Caption => PipelineState::Captioning,
            Stage::Story => PipelineState::Narrating,
            Stage::Speech => PipelineState::Speaking,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Caption => "caption",
            Stage::Story => "story",
            Stage::Speech => "speech",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// PipelineState
// ---------------------------------------------------------------------------

/// States of one pipeline run.
///
/// ```text
/// Idle ──▶ Captioning ──▶ Narrating ──▶ Speaking ──▶ Done
///              │              │            │
///              └──────────────┴────────────┴──▶ Error
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Captioning,
    Narrating,
    Speaking,
    /// All three stages completed (audio may still be absent).
    Done,
    /// A stage failed; later stages were skipped.
    Error,
}

impl PipelineState {
    /// Returns `true` while a stage is executing.
    ///
    /// ```
    /// use img2speech::pipeline::PipelineState;
    ///
    /// assert!(!PipelineState::Idle.is_busy());
    /// assert!(PipelineState::Captioning.is_busy());
    /// assert!(PipelineState::Narrating.is_busy());
    /// assert!(PipelineState::Speaking.is_busy());
    /// assert!(!PipelineState::Done.is_busy());
    /// assert!(!PipelineState::Error.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PipelineState::Captioning | PipelineState::Narrating | PipelineState::Speaking
        )
    }

    /// Short status text for progress output.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "Idle",
            PipelineState::Captioning => "Generating caption...",
            PipelineState::Narrating => "Crafting a short story...",
            PipelineState::Speaking => "Generating speech...",
            PipelineState::Done => "Done",
            PipelineState::Error => "Error",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
