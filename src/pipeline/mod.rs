//! Pipeline module for img2speech.
//!
//! Wires the caption → story → speech stages for one image and reports the
//! outcome of each.
//!
//! # Architecture
//!
//! ```text
//! ImageInput
//!     │
//!     ▼
//! PipelineRunner::run()
//!     │
//!     ├─ caption(image)  ──▶ Backends::caption()  (built once, reused)
//!     ├─ narrate(text)   ──▶ Backends::story()
//!     └─ speak(text)     ──▶ Backends::speech()   (None → configuration error)
//!     │
//!     ▼
//! PipelineReport { caption, story, audio, failure }
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{PipelineEvent, PipelineReport, PipelineRunner, StageError, StageFailure};
pub use state::{PipelineState, Stage};
