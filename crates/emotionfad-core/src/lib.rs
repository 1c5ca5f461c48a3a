//! # EmotionFAD Core
//!
//! Domain types and scoring for the EmotionFAD fraud activity detector.
//! This crate turns facial emotion scores and free-text chat into stress,
//! deception and fraud risk signals, and combines them into a report.
//!
//! The face/emotion model is an external collaborator reached through the
//! [`EmotionDetector`] trait. Sentiment is produced by a
//! [`SentimentAnalyzer`]; the default is a small embedded lexicon.

pub mod analyzer;
pub mod detector;
pub mod emotion;
pub mod error;
pub mod image;
pub mod report;
pub mod scoring;
pub mod text;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use analyzer::{AnalyzerConfig, FraudDetectionSystem};
pub use detector::{
    DetectedFace, DetectorConfig, EmotionDetector, FaceRegion, HttpEmotionDetector,
    UnavailableDetector,
};
pub use emotion::{Emotion, EmotionScores};
pub use error::{AnalysisError, AnalysisResult};
pub use self::image::{DecodedFrame, ImageFormat};
pub use report::{ComprehensiveReport, RiskLevel};
pub use scoring::{FacialAnalysis, FaceReport, FrameAnalysis, FrameStatus};
pub use text::{LexiconSentiment, Sentiment, SentimentAnalyzer, SentimentCategory, TextAnalysis};
