// SPDX-License-Identifier: MPL-2.0
//! Text recognition port definition.
//!
//! This module defines the [`TextRecognizer`] trait for extracting
//! printed text from image bytes, the step that precedes coordinate
//! extraction when processing scanned photos.
//!
//! # Design Notes
//!
//! - Recognition is slow; implementations report progress through the
//!   callback so a caller can drive a per-item progress bar
//! - Language models and engine configuration are implementation-specific

use crate::error::Error;
use std::fmt;

// =============================================================================
// RecognitionError
// =============================================================================

/// Errors that can occur during text recognition.
#[derive(Debug, Clone)]
pub enum RecognitionError {
    /// The recognition engine is not available or not initialized.
    EngineUnavailable(String),

    /// The input bytes could not be decoded as an image.
    InvalidImage(String),

    /// Recognition ran but failed partway through.
    RecognitionFailed(String),
}

impl fmt::Display for RecognitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognitionError::EngineUnavailable(msg) => {
                write!(f, "Recognition engine unavailable: {msg}")
            }
            RecognitionError::InvalidImage(msg) => write!(f, "Invalid image for OCR: {msg}"),
            RecognitionError::RecognitionFailed(msg) => write!(f, "Recognition failed: {msg}"),
        }
    }
}

impl std::error::Error for RecognitionError {}

impl From<RecognitionError> for Error {
    fn from(err: RecognitionError) -> Self {
        Error::Recognition(err.to_string())
    }
}

// =============================================================================
// TextRecognizer Trait
// =============================================================================

/// Port for optical text recognition.
///
/// Implementations wrap an OCR engine and turn image bytes into the raw
/// text printed on the picture. The returned string is fed to the
/// coordinate extractor unmodified; no cleanup is expected here.
pub trait TextRecognizer {
    /// Recognizes text in an encoded image.
    ///
    /// `progress` is called with values from 0 to 100 as recognition
    /// advances; implementations that cannot report granular progress
    /// should call it once with 100 on completion.
    ///
    /// # Errors
    ///
    /// Returns a [`RecognitionError`] if the engine is unavailable, the
    /// image cannot be decoded, or recognition itself fails.
    fn recognize(
        &mut self,
        image: &[u8],
        progress: &mut dyn FnMut(u8),
    ) -> Result<String, RecognitionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognition_error_display() {
        let err = RecognitionError::EngineUnavailable("worker not started".to_string());
        assert!(format!("{err}").contains("worker not started"));

        let err = RecognitionError::RecognitionFailed("page segmentation".to_string());
        assert_eq!(format!("{err}"), "Recognition failed: page segmentation");
    }

    #[test]
    fn recognition_error_converts_into_crate_error() {
        let err: Error = RecognitionError::InvalidImage("truncated".to_string()).into();
        assert!(matches!(err, Error::Recognition(_)));
    }

    // Mock implementation for testing
    struct FixedTextRecognizer {
        text: &'static str,
    }

    impl TextRecognizer for FixedTextRecognizer {
        fn recognize(
            &mut self,
            _image: &[u8],
            progress: &mut dyn FnMut(u8),
        ) -> Result<String, RecognitionError> {
            progress(50);
            progress(100);
            Ok(self.text.to_string())
        }
    }

    #[test]
    fn mock_recognizer_reports_progress() {
        let mut recognizer = FixedTextRecognizer {
            text: "18° 27' 30.6\" N 69° 57' 21.24\" W",
        };
        let mut seen = Vec::new();
        let text = recognizer
            .recognize(b"fake image", &mut |p| seen.push(p))
            .unwrap();
        assert!(text.contains("18°"));
        assert_eq!(seen, vec![50, 100]);
    }
}
