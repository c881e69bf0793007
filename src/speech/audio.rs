//! Synthesised audio payloads and the minimum-size guard.

/// Outcome of a successful speech call.
///
/// `NoAudio` is not an error: the backend answered, but with a payload too
/// small to be real audio.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioResult {
    /// WAV-compatible bytes, at least the configured minimum long.
    Audio(Vec<u8>),
    /// Empty or truncated reply.
    NoAudio,
}

impl AudioResult {
    /// Classify a raw payload against `min_bytes`.
    ///
    /// ```
    /// use img2speech::speech::AudioResult;
    ///
    /// assert_eq!(AudioResult::from_payload(vec![0; 99], 100), AudioResult::NoAudio);
    /// assert!(AudioResult::from_payload(vec![0; 100], 100).is_audio());
    /// ```
    pub fn from_payload(bytes: Vec<u8>, min_bytes: usize) -> Self {
        if bytes.is_empty() || bytes.len() < min_bytes {
            AudioResult::NoAudio
        } else {
            AudioResult::Audio(bytes)
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, AudioResult::Audio(_))
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            AudioResult::Audio(b) => Some(b),
            AudioResult::NoAudio => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            AudioResult::Audio(b) => Some(b),
            AudioResult::NoAudio => None,
        }
    }
}

/// `true` when `bytes` start with a RIFF/WAVE header.
///
/// Informational only; the size guard is the sole validity check.
pub fn looks_like_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}
