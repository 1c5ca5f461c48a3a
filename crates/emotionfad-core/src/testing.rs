//! Detector doubles for tests and offline demos

use crate::detector::{DetectedFace, EmotionDetector, FaceRegion};
use crate::emotion::{Emotion, EmotionScores};
use crate::error::{AnalysisError, AnalysisResult};
use crate::image::DecodedFrame;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns the same faces for every frame and counts calls
#[derive(Debug, Default)]
pub struct FixedDetector {
    faces: Vec<DetectedFace>,
    calls: AtomicUsize,
}

impl FixedDetector {
    pub fn new(faces: Vec<DetectedFace>) -> Self {
        Self {
            faces,
            calls: AtomicUsize::new(0),
        }
    }

    /// A detector that never finds a face
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// A single face at the origin with the given confidences
    pub fn single(pairs: &[(Emotion, f64)]) -> Self {
        Self::new(vec![face(pairs)])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EmotionDetector for FixedDetector {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn detect(&self, _frame: &DecodedFrame) -> AnalysisResult<Vec<DetectedFace>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.faces.clone())
    }
}

/// Always fails as an unreachable model server would
#[derive(Debug, Default)]
pub struct FailingDetector;

#[async_trait]
impl EmotionDetector for FailingDetector {
    fn name(&self) -> &str {
        "failing"
    }

    async fn detect(&self, _frame: &DecodedFrame) -> AnalysisResult<Vec<DetectedFace>> {
        Err(AnalysisError::DetectorFailed {
            message: "connection refused".to_string(),
        })
    }
}

/// Build a face at `(0, 0, 100, 100)`
pub fn face(pairs: &[(Emotion, f64)]) -> DetectedFace {
    DetectedFace {
        region: FaceRegion {
            x: 0,
            y: 0,
            w: 100,
            h: 100,
        },
        emotions: EmotionScores::from_pairs(pairs.iter().copied()),
        face_confidence: Some(0.99),
    }
}

/// JPEG bytes of a plain grey frame
pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let frame = RgbImage::from_pixel(width, height, Rgb([96, 96, 96]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(frame)
        .write_to(&mut out, image::ImageFormat::Jpeg)
        .expect("in-memory JPEG encoding");
    out.into_inner()
}

/// Base64 of a 64x48 grey JPEG frame
pub fn sample_jpeg_base64() -> String {
    STANDARD.encode(sample_jpeg(64, 48))
}
