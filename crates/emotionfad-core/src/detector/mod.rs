//! # Emotion Detector
//!
//! The face emotion model is not part of this crate. It is reached through
//! the [`EmotionDetector`] trait so the service can talk to a remote model
//! server, run without one, or use a fixed double in tests.

use crate::emotion::EmotionScores;
use crate::error::{AnalysisError, AnalysisResult};
use crate::image::DecodedFrame;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod remote;

pub use remote::HttpEmotionDetector;

/// Pixel bounding box of a detected face
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

/// A face found by the model together with its emotion confidences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    pub region: FaceRegion,
    pub emotions: EmotionScores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_confidence: Option<f64>,
}

/// Facial emotion model seam
#[async_trait]
pub trait EmotionDetector: Send + Sync {
    /// Short name used in logs and health output
    fn name(&self) -> &str;

    /// Whether the detector can serve requests
    fn is_ready(&self) -> bool {
        true
    }

    /// Detect faces and their emotions in a decoded frame.
    ///
    /// Returns an empty list when the frame contains no face.
    async fn detect(&self, frame: &DecodedFrame) -> AnalysisResult<Vec<DetectedFace>>;
}

/// Connection settings for a remote emotion model
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Base URL of the model server; requests go to `<base>/analyze`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Model backend name forwarded to the server, if any
    pub backend: Option<String>,
}

impl DetectorConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(20),
            backend: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }
}

/// Stand-in used when no model endpoint is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableDetector;

#[async_trait]
impl EmotionDetector for UnavailableDetector {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn is_ready(&self) -> bool {
        false
    }

    async fn detect(&self, _frame: &DecodedFrame) -> AnalysisResult<Vec<DetectedFace>> {
        Err(AnalysisError::DetectorUnavailable)
    }
}
