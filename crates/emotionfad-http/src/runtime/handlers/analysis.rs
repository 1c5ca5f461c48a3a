//! Analysis HTTP handlers
//!
//! Facial, text and combined fraud analysis over JSON bodies. Successful
//! responses are the analysis record flattened next to `"success": true`;
//! failures use the [`ErrorResponse`] envelope. `/api/analyze` also takes a
//! multipart file upload.

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header,
    response::Json,
};
use emotionfad_core::{
    AnalysisError, ComprehensiveReport, FacialAnalysis, FrameAnalysis, TextAnalysis,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::runtime::{
    AppState,
    error::{ApiError, ApiJson, ApiResult, ErrorResponse},
};

/// Multipart field carrying the uploaded image
const UPLOAD_FIELD: &str = "image";

/// Body of `POST /analyze/facial` and `POST /api/analyze`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ImageRequest {
    /// Base64 image or `data:image/...;base64,` URL
    #[serde(default)]
    pub image: Option<String>,
}

/// Multipart form accepted by `POST /api/analyze`
#[derive(Debug, ToSchema)]
pub struct ImageUploadForm {
    /// Image file; an empty file name is rejected
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Image for frame analysis, as JSON base64 or as an uploaded file
#[derive(Debug)]
pub enum FrameUpload {
    Base64(String),
    File { file_name: String, bytes: Vec<u8> },
}

impl FrameUpload {
    async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        while let Some(field) = multipart.next_field().await? {
            if field.name() != Some(UPLOAD_FIELD) {
                continue;
            }
            return match field.file_name().map(str::to_string) {
                Some(file_name) if file_name.trim().is_empty() => {
                    Err(ApiError::invalid_upload("No selected file"))
                }
                Some(file_name) => {
                    let bytes = field.bytes().await?.to_vec();
                    Ok(Self::File { file_name, bytes })
                }
                // A plain form value is treated like the JSON field
                None => {
                    let text = field.text().await?;
                    present(Some(text))
                        .map(Self::Base64)
                        .ok_or(AnalysisError::MissingImage.into())
                }
            };
        }
        Err(AnalysisError::MissingImage.into())
    }
}

impl<S> FromRequest<S> for FrameUpload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state).await?;
            return Self::from_multipart(multipart).await;
        }

        let ApiJson(request) = ApiJson::<ImageRequest>::from_request(req, state).await?;
        present(request.image)
            .map(Self::Base64)
            .ok_or(AnalysisError::MissingImage.into())
    }
}

/// Body of `POST /analyze/text`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Body of `POST /analyze/comprehensive`
///
/// Prior results from the facial and text endpoints take precedence over
/// the raw `image` and `text` fields.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ComprehensiveRequest {
    /// Response previously returned by `/analyze/facial`
    #[serde(default)]
    pub facial_data: Option<serde_json::Value>,
    /// Response previously returned by `/analyze/text`
    #[serde(default)]
    pub text_data: Option<serde_json::Value>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Successful response wrapper
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Non-blank field value
fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

/// A prior result is reused only when it parses and reports success
fn prior_result<T: DeserializeOwned>(value: Option<serde_json::Value>) -> Option<T> {
    let value = value?;
    if value.get("success").and_then(serde_json::Value::as_bool) != Some(true) {
        return None;
    }
    match serde_json::from_value(value) {
        Ok(result) => Some(result),
        Err(e) => {
            debug!(error = %e, "Ignoring unparseable prior result");
            None
        }
    }
}

/// POST /analyze/facial - Emotion, stress and deception analysis of one face
#[utoipa::path(
    post,
    path = "/analyze/facial",
    tag = "analysis",
    request_body = ImageRequest,
    responses(
        (status = 200, description = "Facial analysis of the first detected face", body = serde_json::Value),
        (status = 400, description = "Missing or undecodable image, or no face found", body = ErrorResponse),
        (status = 502, description = "Emotion detector failed", body = ErrorResponse),
        (status = 503, description = "Emotion analyzer not initialized", body = ErrorResponse)
    )
)]
pub async fn analyze_facial(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ImageRequest>,
) -> ApiResult<Json<ApiSuccess<FacialAnalysis>>> {
    let image = present(request.image).ok_or(AnalysisError::MissingImage)?;
    let analysis = state.system.analyze_facial(&image).await?;
    Ok(Json(ApiSuccess::new(analysis)))
}

/// POST /analyze/text - Sentiment and fraud signal scan of chat text
#[utoipa::path(
    post,
    path = "/analyze/text",
    tag = "analysis",
    request_body = TextRequest,
    responses(
        (status = 200, description = "Text fraud analysis", body = serde_json::Value),
        (status = 400, description = "No text provided", body = ErrorResponse)
    )
)]
pub async fn analyze_text(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TextRequest>,
) -> ApiResult<Json<ApiSuccess<TextAnalysis>>> {
    let text = request.text.ok_or(AnalysisError::MissingText)?;
    let analysis = state.system.analyze_text(&text)?;
    Ok(Json(ApiSuccess::new(analysis)))
}

/// POST /analyze/comprehensive - Combined fraud risk report
///
/// Sources that cannot be analyzed are left out of the report rather than
/// failing the request.
#[utoipa::path(
    post,
    path = "/analyze/comprehensive",
    tag = "analysis",
    request_body = ComprehensiveRequest,
    responses(
        (status = 200, description = "Comprehensive fraud risk report", body = serde_json::Value),
        (status = 400, description = "Malformed request body", body = ErrorResponse)
    )
)]
pub async fn analyze_comprehensive(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ComprehensiveRequest>,
) -> ApiResult<Json<ApiSuccess<ComprehensiveReport>>> {
    let facial = match prior_result::<FacialAnalysis>(request.facial_data) {
        Some(facial) => Some(facial),
        None => match present(request.image) {
            Some(image) => state
                .system
                .analyze_facial(&image)
                .await
                .inspect_err(|e| warn!(error = %e, "Facial analysis skipped in report"))
                .ok(),
            None => None,
        },
    };

    let text = match prior_result::<TextAnalysis>(request.text_data) {
        Some(text) => Some(text),
        None => match present(request.text) {
            Some(text) => state
                .system
                .analyze_text(&text)
                .inspect_err(|e| warn!(error = %e, "Text analysis skipped in report"))
                .ok(),
            None => None,
        },
    };

    let report = state.system.generate_report(facial.as_ref(), text.as_ref());
    Ok(Json(ApiSuccess::new(report)))
}

/// POST /api/analyze - Emotion analysis of every face in a frame
#[utoipa::path(
    post,
    path = "/api/analyze",
    tag = "analysis",
    request_body(
        content(
            (ImageRequest = "application/json"),
            (ImageUploadForm = "multipart/form-data")
        )
    ),
    responses(
        (status = 200, description = "Per-face emotion analysis with an annotated frame", body = serde_json::Value),
        (status = 400, description = "Missing, unselected or undecodable image", body = ErrorResponse),
        (status = 502, description = "Emotion detector failed", body = ErrorResponse),
        (status = 503, description = "Emotion analyzer not initialized", body = ErrorResponse)
    )
)]
pub async fn analyze_frame(
    State(state): State<AppState>,
    upload: FrameUpload,
) -> ApiResult<Json<FrameAnalysis>> {
    let analysis = match upload {
        FrameUpload::Base64(image) => state.system.analyze_frame(&image).await?,
        FrameUpload::File { file_name, bytes } => {
            debug!(file_name = %file_name, bytes = bytes.len(), "Analyzing uploaded image");
            state.system.analyze_frame_bytes(bytes).await?
        }
    };
    Ok(Json(analysis))
}
