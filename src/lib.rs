//! # EmotionFAD
//!
//! Fraud activity detection from facial emotion and chat sentiment.
//!
//! This crate re-exports the workspace crates behind one dependency:
//!
//! - [`analysis`]: emotion scores, text scanning, scoring formulas and the
//!   [`FraudDetectionSystem`] facade
//! - [`server`]: the axum REST and WebSocket server
//!
//! ```no_run
//! use emotionfad::FraudDetectionSystem;
//!
//! let system = FraudDetectionSystem::default();
//! let analysis = system.analyze_text("send me money by bitcoin").unwrap();
//! assert!(analysis.fraud_keywords_found.contains(&"bitcoin".to_string()));
//! ```

pub use emotionfad_core as analysis;
pub use emotionfad_http as server;

pub use emotionfad_core::{
    AnalysisError, AnalysisResult, ComprehensiveReport, Emotion, EmotionDetector, EmotionScores,
    FacialAnalysis, FrameAnalysis, FraudDetectionSystem, RiskLevel, TextAnalysis,
};
pub use emotionfad_http::{AppState, ServerConfig, ServerConfigBuilder, create_router};
