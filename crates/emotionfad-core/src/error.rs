//! # Error Types
//!
//! Failures that can occur while decoding input, calling the external
//! emotion model, or scanning text. Each variant renders a message that is
//! safe to hand back to a client.

use thiserror::Error;

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Hint returned alongside a failed facial analysis
pub const FACE_NOT_VISIBLE_HINT: &str =
    "Could not detect face. Please ensure your face is clearly visible with good lighting.";

/// Errors produced by the analysis pipeline
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No image payload was supplied
    #[error("No image data provided")]
    MissingImage,

    /// No text payload was supplied, or it was blank
    #[error("No text provided")]
    MissingText,

    /// The payload was not valid base64
    #[error("Invalid base64 image data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The decoded bytes do not carry a known image signature
    #[error("Failed to decode image")]
    UnrecognizedImage,

    /// The decoded frame exceeds the configured size limit
    #[error("Image too large: {size} bytes (limit {limit})")]
    ImageTooLarge { size: usize, limit: usize },

    /// The model returned no face for the frame
    #[error("No face detected")]
    NoFaceDetected,

    /// No emotion model is configured
    #[error("Emotion analyzer not initialized")]
    DetectorUnavailable,

    /// The emotion model could not be reached or returned an error status
    #[error("Emotion detector failed: {message}")]
    DetectorFailed { message: String },

    /// The emotion model did not answer in time
    #[error("Emotion detector timed out after {timeout_ms}ms")]
    DetectorTimeout { timeout_ms: u64 },

    /// The emotion model answered with a body we could not interpret
    #[error("Unexpected detector response: {message}")]
    DetectorProtocol { message: String },

    /// An annotated frame could not be re-encoded
    #[error("Failed to encode annotated frame: {message}")]
    ImageEncoding { message: String },

    /// The detector endpoint configuration is unusable
    #[error("Invalid detector configuration: {message}")]
    InvalidDetectorConfig { message: String },
}

impl AnalysisError {
    /// Whether the failure was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingImage
                | Self::MissingText
                | Self::InvalidBase64(_)
                | Self::UnrecognizedImage
                | Self::ImageTooLarge { .. }
                | Self::NoFaceDetected
        )
    }

    /// Whether the failure came from the external emotion model
    pub fn is_detector_error(&self) -> bool {
        matches!(
            self,
            Self::DetectorFailed { .. } | Self::DetectorTimeout { .. } | Self::DetectorProtocol { .. }
        )
    }

    /// Extra guidance for the client, when there is any
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoFaceDetected
            | Self::DetectorFailed { .. }
            | Self::DetectorTimeout { .. }
            | Self::DetectorProtocol { .. } => Some(FACE_NOT_VISIBLE_HINT),
            _ => None,
        }
    }
}
