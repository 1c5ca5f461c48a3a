//! # Scoring
//!
//! Constant-coefficient formulas that turn emotion confidences and text
//! signals into bounded risk indicators, plus the per-face result records
//! built from them.
//!
//! | Indicator | Range | Source |
//! |-----------|-------|--------|
//! | stress level | 0.0 - 1.0 | weighted sum of all seven emotions |
//! | deception risk | 0.0 - 1.0 | fear, surprise, anger minus happiness |
//! | mental health | 0 - 100 | positive minus half of negative emotions |
//! | fraud risk | 0.0 - 1.0 | keywords, patterns, polarity, subjectivity |

use crate::detector::{DetectedFace, FaceRegion};
use crate::emotion::{Emotion, EmotionScores};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-emotion contribution to stress
const STRESS_WEIGHTS: [(Emotion, f64); 7] = [
    (Emotion::Angry, 0.8),
    (Emotion::Fear, 0.9),
    (Emotion::Sad, 0.6),
    (Emotion::Disgust, 0.7),
    (Emotion::Surprise, 0.3),
    (Emotion::Neutral, 0.1),
    (Emotion::Happy, 0.0),
];

/// Stress level in [0, 1]
pub fn stress_level(emotions: &EmotionScores) -> f64 {
    let stress: f64 = STRESS_WEIGHTS
        .iter()
        .map(|(emotion, weight)| emotions.get(*emotion) * weight)
        .sum();
    (stress / 100.0).clamp(0.0, 1.0)
}

/// Deception risk in [0, 1]
pub fn deception_risk(emotions: &EmotionScores) -> f64 {
    let score = (emotions.fear * 0.4 + emotions.surprise * 0.2 + emotions.angry * 0.3
        - emotions.happy * 0.1)
        / 100.0;
    score.clamp(0.0, 1.0)
}

/// Mental health score in [0, 100]; higher is better
pub fn mental_health_score(emotions: &EmotionScores) -> f64 {
    let positive = emotions.happy + emotions.neutral * 0.5;
    let negative = emotions.sad + emotions.angry + emotions.fear + emotions.disgust;
    (positive - negative * 0.5).clamp(0.0, 100.0)
}

/// Fraud risk of a text in [0, 1].
///
/// Non-decreasing in both `keyword_count` and `pattern_count`.
pub fn fraud_risk(
    polarity: f64,
    keyword_count: usize,
    pattern_count: usize,
    subjectivity: f64,
) -> f64 {
    let keyword_score = (keyword_count as f64 * 0.2).min(0.5);
    let pattern_score = (pattern_count as f64 * 0.25).min(0.4);
    let sentiment_score = (-polarity * 0.3).max(0.0);
    let subjectivity_score = subjectivity.clamp(0.0, 1.0) * 0.1;

    (keyword_score + pattern_score + sentiment_score + subjectivity_score).min(1.0)
}

/// Facial analysis of the primary face in a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacialAnalysis {
    pub emotions: EmotionScores,
    pub dominant_emotion: Emotion,
    pub stress_level: f64,
    pub deception_risk: f64,
    pub mental_health_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<FaceRegion>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl FacialAnalysis {
    /// Score a set of emotion confidences
    pub fn from_scores(emotions: EmotionScores, region: Option<FaceRegion>) -> Self {
        let emotions = emotions.sanitized();
        let (dominant_emotion, _) = emotions.dominant();

        Self {
            stress_level: stress_level(&emotions),
            deception_risk: deception_risk(&emotions),
            mental_health_score: mental_health_score(&emotions),
            dominant_emotion,
            emotions,
            region,
            timestamp: Utc::now(),
        }
    }

    /// Confidence of the dominant emotion
    pub fn dominant_confidence(&self) -> f64 {
        self.emotions.get(self.dominant_emotion)
    }
}

impl From<&DetectedFace> for FacialAnalysis {
    fn from(face: &DetectedFace) -> Self {
        Self::from_scores(face.emotions, Some(face.region))
    }
}

/// Outcome of a multi-face frame analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    Success,
    NoFaces,
}

/// One face inside a [`FrameAnalysis`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceReport {
    #[serde(rename = "box")]
    pub region: FaceRegion,
    pub emotions: EmotionScores,
    pub dominant_emotion: Emotion,
    pub confidence: f64,
}

impl From<&DetectedFace> for FaceReport {
    fn from(face: &DetectedFace) -> Self {
        let emotions = face.emotions.sanitized();
        let (dominant_emotion, confidence) = emotions.dominant();
        Self {
            region: face.region,
            emotions,
            dominant_emotion,
            confidence,
        }
    }
}

/// Every face found in a single video frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    pub status: FrameStatus,
    pub faces_detected: usize,
    pub analysis: Vec<FaceReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// JPEG data URL of the frame with each face boxed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_with_boxes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl FrameAnalysis {
    pub fn from_faces(faces: &[DetectedFace]) -> Self {
        let analysis: Vec<FaceReport> = faces.iter().map(FaceReport::from).collect();
        let (status, message) = if analysis.is_empty() {
            (FrameStatus::NoFaces, Some("No faces detected".to_string()))
        } else {
            (FrameStatus::Success, None)
        };

        Self {
            status,
            faces_detected: analysis.len(),
            analysis,
            message,
            frame_with_boxes: None,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_frame_with_boxes(mut self, data_url: String) -> Self {
        self.frame_with_boxes = Some(data_url);
        self
    }
}
