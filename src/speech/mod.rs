//! Speech stage: story text → audio bytes, or an explicit "no audio".
//!
//! This module provides:
//! * [`SpeechBackend`] — async trait implemented by text-to-speech backends.
//! * [`HfSpeechSynthesizer`] — HTTP backend (Kokoro by default).
//! * [`AudioResult`] — audio payload or the `NoAudio` outcome.
//! * [`speak`] — the stage function used by the pipeline.
//! * [`SpeechError`] — configuration and runtime error variants.

pub mod audio;
pub mod synthesizer;

pub use audio::{looks_like_wav, AudioResult};
pub use synthesizer::{HfSpeechSynthesizer, SpeechBackend, SpeechError};

/// Synthesise `text`.
///
/// * `backend == None` → [`SpeechError::MissingCredential`], before any call.
/// * Backend fault → the corresponding runtime [`SpeechError`].
/// * Payload shorter than `min_audio_bytes` → `Ok(AudioResult::NoAudio)`.
pub async fn speak(
    backend: Option<&dyn SpeechBackend>,
    text: &str,
    min_audio_bytes: usize,
) -> Result<AudioResult, SpeechError> {
    let backend = backend.ok_or(SpeechError::MissingCredential)?;

    let payload = backend.synthesize(text).await?;
    let len = payload.len();
    let result = AudioResult::from_payload(payload, min_audio_bytes);

    match &result {
        AudioResult::Audio(bytes) => {
            if !looks_like_wav(bytes) {
                log::debug!("speech: payload has no RIFF/WAVE header");
            }
            log::info!("speech: {len} bytes of audio");
        }
        AudioResult::NoAudio => {
            log::warn!("speech: reply of {len} bytes is below {min_audio_bytes}, no audio produced");
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        payload: Vec<u8>,
        calls: AtomicUsize,
    }

    impl Counting {
        fn returning(len: usize) -> Self {
            Self {
                payload: vec![0xAB; len],
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SpeechBackend for Counting {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, SpeechError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }
    }

    struct Down;

    #[async_trait]
    impl SpeechBackend for Down {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, SpeechError> {
            Err(SpeechError::Status {
                status: 503,
                body: "unavailable".into(),
            })
        }
    }

    #[tokio::test]
    async fn short_payload_is_no_audio_not_error() {
        let backend = Counting::returning(50);
        let result = speak(Some(&backend as &dyn SpeechBackend), "hello", 100).await.unwrap();
        assert_eq!(result, AudioResult::NoAudio);
    }

    #[tokio::test]
    async fn sufficient_payload_is_returned_whole() {
        let backend = Counting::returning(2000);
        let result = speak(Some(&backend as &dyn SpeechBackend), "hello", 100).await.unwrap();
        assert_eq!(result.bytes().map(<[u8]>::len), Some(2000));
    }

    #[tokio::test]
    async fn missing_backend_is_configuration_error() {
        let err = speak(None, "hello", 100).await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn backend_fault_is_runtime_error() {
        let err = speak(Some(&Down as &dyn SpeechBackend), "hello", 100).await.unwrap_err();
        assert!(matches!(err, SpeechError::Status { status: 503, .. }));
        assert!(!err.is_configuration());
    }

    #[tokio::test]
    async fn backend_called_exactly_once() {
        let backend = Counting::returning(500);
        speak(Some(&backend as &dyn SpeechBackend), "hello", 100).await.unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
