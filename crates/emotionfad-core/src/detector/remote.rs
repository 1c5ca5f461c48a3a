//! HTTP client for a DeepFace-compatible model server.
//!
//! The server is expected to expose `POST /analyze` taking
//! `{"img": <data url>, "actions": ["emotion"], "enforce_detection": false}`
//! and answering with either `{"results": [...]}` or a bare list of faces.
//!
//! The client does not retry. A failed call surfaces as an
//! [`AnalysisError`] and the caller reports it.

use super::{DetectedFace, DetectorConfig, EmotionDetector, FaceRegion};
use crate::emotion::EmotionScores;
use crate::error::{AnalysisError, AnalysisResult};
use crate::image::DecodedFrame;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Longest slice of an error body echoed into error messages
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Emotion detector backed by a remote model server
#[derive(Clone)]
pub struct HttpEmotionDetector {
    endpoint: Url,
    http: Client,
    config: DetectorConfig,
}

impl std::fmt::Debug for HttpEmotionDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmotionDetector")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    img: String,
    actions: [&'a str; 1],
    enforce_detection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    detector_backend: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnalyzeResponse {
    Wrapped { results: Vec<RawFace> },
    Bare(Vec<RawFace>),
    Single(RawFace),
}

impl AnalyzeResponse {
    fn into_faces(self) -> Vec<RawFace> {
        match self {
            Self::Wrapped { results } | Self::Bare(results) => results,
            Self::Single(face) => vec![face],
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFace {
    emotion: EmotionScores,
    #[serde(default)]
    region: Option<RawRegion>,
    #[serde(default)]
    face_confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRegion {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl From<RawRegion> for FaceRegion {
    fn from(r: RawRegion) -> Self {
        Self {
            x: r.x.round() as i64,
            y: r.y.round() as i64,
            w: r.w.round() as i64,
            h: r.h.round() as i64,
        }
    }
}

impl From<RawFace> for DetectedFace {
    fn from(raw: RawFace) -> Self {
        Self {
            region: raw.region.map(FaceRegion::from).unwrap_or_default(),
            emotions: raw.emotion.sanitized(),
            face_confidence: raw.face_confidence,
        }
    }
}

impl HttpEmotionDetector {
    /// Create a detector for the model server described by `config`
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidDetectorConfig`] if the base URL does
    /// not parse, is not http(s), or the HTTP client cannot be built.
    pub fn new(config: DetectorConfig) -> AnalysisResult<Self> {
        let endpoint = analyze_endpoint(&config.base_url)?;
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AnalysisError::InvalidDetectorConfig {
                message: e.to_string(),
            })?;

        Ok(Self {
            endpoint,
            http,
            config,
        })
    }

    /// Full URL the detector posts frames to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn map_transport_error(&self, err: reqwest::Error) -> AnalysisError {
        if err.is_timeout() {
            AnalysisError::DetectorTimeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            AnalysisError::DetectorFailed {
                message: err.to_string(),
            }
        }
    }
}

fn analyze_endpoint(base_url: &str) -> AnalysisResult<Url> {
    let invalid = |message: String| AnalysisError::InvalidDetectorConfig { message };

    let mut base = Url::parse(base_url).map_err(|e| invalid(format!("{base_url}: {e}")))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "unsupported scheme '{}', expected http or https",
            base.scheme()
        )));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("analyze")
        .map_err(|e| invalid(format!("{base_url}: {e}")))
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[async_trait]
impl EmotionDetector for HttpEmotionDetector {
    fn name(&self) -> &str {
        "http"
    }

    async fn detect(&self, frame: &DecodedFrame) -> AnalysisResult<Vec<DetectedFace>> {
        let request = AnalyzeRequest {
            img: frame.to_data_url(),
            actions: ["emotion"],
            enforce_detection: false,
            detector_backend: self.config.backend.as_deref(),
        };

        debug!(
            endpoint = %self.endpoint,
            format = %frame.format(),
            bytes = frame.len(),
            "Sending frame to emotion detector"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            warn!(status = %status, "Emotion detector returned an error status");
            return Err(AnalysisError::DetectorFailed {
                message: format!("HTTP {}: {}", status.as_u16(), truncate(&body)),
            });
        }

        let parsed: AnalyzeResponse =
            serde_json::from_str(&body).map_err(|e| AnalysisError::DetectorProtocol {
                message: e.to_string(),
            })?;

        let faces: Vec<DetectedFace> = parsed.into_faces().into_iter().map(Into::into).collect();
        debug!(faces = faces.len(), "Emotion detector responded");
        Ok(faces)
    }
}
