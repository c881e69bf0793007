//! Caption stage: image → text caption.
//!
//! This module provides:
//! * [`CaptionBackend`] — async trait implemented by vision-to-text backends.
//! * [`HfCaptioner`] — HTTP image-to-text backend.
//! * [`caption`] — the stage function used by the pipeline.
//! * [`CaptionError`] — error variants for captioning.

pub mod captioner;

pub use captioner::{CaptionBackend, CaptionCandidate, CaptionError, HfCaptioner};

use crate::input::ImageInput;

/// Caption `image` with `backend`.
///
/// Only the first candidate is used.  No candidates, or an empty first
/// candidate, produce an empty caption rather than an error.
pub async fn caption(backend: &dyn CaptionBackend, image: &ImageInput) -> Result<String, CaptionError> {
    let candidates = backend.describe(image).await?;

    let text = candidates
        .into_iter()
        .next()
        .map(|c| c.generated_text.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        log::warn!("caption: backend returned no usable caption");
    } else {
        log::info!("caption: {text:?}");
    }

    Ok(text)
}
