//! # Fraud Detection System
//!
//! Facade over the emotion detector, the sentiment analyzer and the scoring
//! functions. One instance is shared by every request handler.

use crate::detector::{EmotionDetector, UnavailableDetector};
use crate::error::{AnalysisError, AnalysisResult};
use crate::image::{DEFAULT_MAX_FRAME_BYTES, DecodedFrame};
use crate::report::ComprehensiveReport;
use crate::scoring::{FacialAnalysis, FrameAnalysis};
use crate::text::{LexiconSentiment, SentimentAnalyzer, TextAnalysis};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default risk above which text is flagged as suspicious
pub const DEFAULT_FRAUD_THRESHOLD: f64 = 0.6;

/// Tuning knobs for [`FraudDetectionSystem`]
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Text with a fraud risk strictly above this is suspicious
    pub fraud_threshold: f64,
    /// Largest decoded frame accepted
    pub max_frame_bytes: usize,
    /// Attach `frame_with_boxes` to frame analyses that found faces
    pub annotate_frames: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fraud_threshold: DEFAULT_FRAUD_THRESHOLD,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            annotate_frames: true,
        }
    }
}

/// Facial, textual and combined fraud analysis
#[derive(Clone)]
pub struct FraudDetectionSystem {
    detector: Arc<dyn EmotionDetector>,
    sentiment: Arc<dyn SentimentAnalyzer>,
    config: AnalyzerConfig,
}

impl std::fmt::Debug for FraudDetectionSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FraudDetectionSystem")
            .field("detector", &self.detector.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for FraudDetectionSystem {
    fn default() -> Self {
        Self::new(Arc::new(UnavailableDetector))
    }
}

impl FraudDetectionSystem {
    /// Create a system with the lexicon sentiment analyzer and default config
    pub fn new(detector: Arc<dyn EmotionDetector>) -> Self {
        Self {
            detector,
            sentiment: Arc::new(LexiconSentiment::new()),
            config: AnalyzerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_sentiment(mut self, sentiment: Arc<dyn SentimentAnalyzer>) -> Self {
        self.sentiment = sentiment;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn detector_ready(&self) -> bool {
        self.detector.is_ready()
    }

    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    /// Decode a base64 frame using the configured size limit
    pub fn decode_frame(&self, image: &str) -> AnalysisResult<DecodedFrame> {
        DecodedFrame::from_base64(image, self.config.max_frame_bytes)
    }

    /// Validate raw image bytes using the configured size limit
    pub fn decode_bytes(&self, bytes: Vec<u8>) -> AnalysisResult<DecodedFrame> {
        DecodedFrame::from_bytes(bytes, self.config.max_frame_bytes)
    }

    /// Score the first face found in a base64 image.
    ///
    /// # Errors
    ///
    /// Fails with [`AnalysisError::NoFaceDetected`] when the model finds no
    /// face, and with the decoding or detector error otherwise.
    pub async fn analyze_facial(&self, image: &str) -> AnalysisResult<FacialAnalysis> {
        if !self.detector.is_ready() {
            return Err(AnalysisError::DetectorUnavailable);
        }
        let frame = self.decode_frame(image)?;
        let faces = self.detector.detect(&frame).await?;

        let face = faces.first().ok_or(AnalysisError::NoFaceDetected)?;
        let analysis = FacialAnalysis::from(face);
        debug!(
            faces = faces.len(),
            dominant = %analysis.dominant_emotion,
            stress = analysis.stress_level,
            deception = analysis.deception_risk,
            "Facial analysis complete"
        );
        Ok(analysis)
    }

    /// Report every face in a base64 video frame
    pub async fn analyze_frame(&self, image: &str) -> AnalysisResult<FrameAnalysis> {
        if !self.detector.is_ready() {
            return Err(AnalysisError::DetectorUnavailable);
        }
        let frame = self.decode_frame(image)?;
        self.analyze_decoded_frame(&frame).await
    }

    /// Report every face in raw image bytes, such as an uploaded file
    pub async fn analyze_frame_bytes(&self, bytes: Vec<u8>) -> AnalysisResult<FrameAnalysis> {
        if !self.detector.is_ready() {
            return Err(AnalysisError::DetectorUnavailable);
        }
        let frame = self.decode_bytes(bytes)?;
        self.analyze_decoded_frame(&frame).await
    }

    /// Report every face in an already decoded frame
    pub async fn analyze_decoded_frame(&self, frame: &DecodedFrame) -> AnalysisResult<FrameAnalysis> {
        if !self.detector.is_ready() {
            return Err(AnalysisError::DetectorUnavailable);
        }
        let faces = self.detector.detect(frame).await?;
        let (width, height) = frame.dimensions();
        debug!(
            faces = faces.len(),
            format = %frame.format(),
            width,
            height,
            "Frame analyzed"
        );

        let analysis = FrameAnalysis::from_faces(&faces);
        if faces.is_empty() || !self.config.annotate_frames {
            return Ok(analysis);
        }

        match frame.annotate(faces.iter().map(|face| &face.region)) {
            Ok(data_url) => Ok(analysis.with_frame_with_boxes(data_url)),
            Err(e) => {
                warn!(error = %e, "Returning frame analysis without annotated frame");
                Ok(analysis)
            }
        }
    }

    /// Scan text for fraud signals.
    ///
    /// Blank text fails with [`AnalysisError::MissingText`].
    pub fn analyze_text(&self, text: &str) -> AnalysisResult<TextAnalysis> {
        if text.trim().is_empty() {
            return Err(AnalysisError::MissingText);
        }
        let sentiment = self.sentiment.analyze(text);
        let analysis = TextAnalysis::scan(text, sentiment, self.config.fraud_threshold);
        if analysis.is_suspicious {
            info!(
                risk = analysis.fraud_risk_score,
                keywords = analysis.fraud_keywords_found.len(),
                patterns = analysis.suspicious_patterns_count,
                "Suspicious text detected"
            );
        }
        Ok(analysis)
    }

    pub fn generate_report(
        &self,
        facial: Option<&FacialAnalysis>,
        text: Option<&TextAnalysis>,
    ) -> ComprehensiveReport {
        let report = ComprehensiveReport::generate(facial, text);
        debug!(
            score = report.overall_risk_score,
            level = %report.risk_level,
            factors = report.risk_factors.len(),
            "Report generated"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::Emotion;
    use crate::testing::{FixedDetector, sample_jpeg, sample_jpeg_base64};

    #[test]
    fn test_blank_text_rejected() {
        let system = FraudDetectionSystem::default();
        assert!(matches!(
            system.analyze_text("   \n"),
            Err(AnalysisError::MissingText)
        ));
    }

    #[test]
    fn test_text_uses_configured_threshold() {
        let system = FraudDetectionSystem::default().with_config(AnalyzerConfig {
            fraud_threshold: 0.1,
            ..AnalyzerConfig::default()
        });
        let analysis = system.analyze_text("is this a scam?").unwrap();
        assert!(analysis.is_suspicious);
    }

    #[tokio::test]
    async fn test_frame_with_faces_is_annotated() {
        let system = FraudDetectionSystem::new(Arc::new(FixedDetector::single(&[(
            Emotion::Sad,
            70.0,
        )])));
        let analysis = system.analyze_frame(&sample_jpeg_base64()).await.unwrap();

        assert_eq!(analysis.faces_detected, 1);
        let boxed = analysis.frame_with_boxes.unwrap();
        assert!(boxed.starts_with("data:image/jpeg;base64,"));
        assert!(system.decode_frame(&boxed).is_ok());
    }

    #[tokio::test]
    async fn test_frame_annotation_skipped_without_faces_or_when_disabled() {
        let system = FraudDetectionSystem::new(Arc::new(FixedDetector::empty()));
        let analysis = system.analyze_frame(&sample_jpeg_base64()).await.unwrap();
        assert!(analysis.frame_with_boxes.is_none());

        let system = FraudDetectionSystem::new(Arc::new(FixedDetector::single(&[(
            Emotion::Happy,
            80.0,
        )])))
        .with_config(AnalyzerConfig {
            annotate_frames: false,
            ..AnalyzerConfig::default()
        });
        let analysis = system.analyze_frame(&sample_jpeg_base64()).await.unwrap();
        assert_eq!(analysis.faces_detected, 1);
        assert!(analysis.frame_with_boxes.is_none());
    }

    #[tokio::test]
    async fn test_uploaded_bytes_use_frame_limit() {
        let system = FraudDetectionSystem::new(Arc::new(FixedDetector::empty())).with_config(
            AnalyzerConfig {
                max_frame_bytes: 8,
                ..AnalyzerConfig::default()
            },
        );
        assert!(matches!(
            system.decode_bytes(sample_jpeg(16, 16)),
            Err(AnalysisError::ImageTooLarge { limit: 8, .. })
        ));
    }

    #[tokio::test]
    async fn test_frame_bytes_analyzed_like_base64() {
        let system = FraudDetectionSystem::new(Arc::new(FixedDetector::single(&[(
            Emotion::Angry,
            65.0,
        )])));
        let analysis = system.analyze_frame_bytes(sample_jpeg(32, 32)).await.unwrap();
        assert_eq!(analysis.faces_detected, 1);
        assert!(analysis.frame_with_boxes.is_some());

        assert!(matches!(
            system.analyze_frame_bytes(b"not an image".to_vec()).await,
            Err(AnalysisError::UnrecognizedImage)
        ));
        assert!(matches!(
            FraudDetectionSystem::default()
                .analyze_frame_bytes(sample_jpeg(8, 8))
                .await,
            Err(AnalysisError::DetectorUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_unavailable_detector_reported() {
        let system = FraudDetectionSystem::default();
        assert!(!system.detector_ready());
        assert_eq!(system.detector_name(), "unavailable");
        assert!(matches!(
            system.analyze_facial("aGVsbG8=").await,
            Err(AnalysisError::DetectorUnavailable)
        ));
        assert!(matches!(
            system.analyze_frame("aGVsbG8=").await,
            Err(AnalysisError::DetectorUnavailable)
        ));
    }
}
