//! Uploaded image input.
//!
//! [`ImageInput`] carries the raw bytes of one uploaded image together with
//! the extension the uploader declared.  It is created per request, handed to
//! the caption stage once and dropped afterwards.
//!
//! Only JPEG and PNG are accepted.  The declared extension is informational;
//! the actual format is sniffed from the bytes and the image is decoded once
//! so undecodable uploads are rejected before any network call.

use std::path::Path;

use image::ImageFormat;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ImageError
// ---------------------------------------------------------------------------

/// Reasons an upload cannot be used as caption input.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The file could not be read.
    #[error("failed to read image {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The upload contained no bytes.
    #[error("image is empty")]
    Empty,

    /// The bytes are not a JPEG or PNG image.
    #[error("unsupported image format (expected JPEG or PNG)")]
    UnsupportedFormat,

    /// The header looked right but the image failed to decode.
    #[error("image could not be decoded: {0}")]
    Undecodable(String),
}

// ---------------------------------------------------------------------------
// ImageInput
// ---------------------------------------------------------------------------

/// One uploaded image: raw bytes plus the declared file extension.
#[derive(Debug, Clone)]
pub struct ImageInput {
    bytes: Vec<u8>,
    extension: String,
    format: ImageFormat,
}

impl ImageInput {
    /// Validate `bytes` and wrap them.
    ///
    /// `extension` is stored lower-cased without a leading dot.
    pub fn from_bytes(bytes: Vec<u8>, extension: &str) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        let format = match image::guess_format(&bytes) {
            Ok(f @ (ImageFormat::Jpeg | ImageFormat::Png)) => f,
            _ => return Err(ImageError::UnsupportedFormat),
        };

        image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| ImageError::Undecodable(e.to_string()))?;

        Ok(Self {
            bytes,
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
            format,
        })
    }

    /// Read and validate an image file; the extension comes from the path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ImageError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_bytes(bytes, extension)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Extension declared by the uploader (may disagree with the content).
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// MIME type of the sniffed format, used as the request `Content-Type`.
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
