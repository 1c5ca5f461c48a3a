//! Unified error handling for the HTTP runtime
//!
//! Every failing handler answers with the same envelope:
//! `{"success": false, "error": <message>, "message": <hint?>}`. This module
//! maps domain errors and request rejections onto that envelope and
//! attaches a request ID to every response.

use crate::runtime::rate_limit::LimitScope;
use axum::{
    extract::{
        FromRequest, Request,
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::{
        StatusCode,
        header::{self, HeaderValue},
    },
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use emotionfad_core::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for client-provided request IDs
const MAX_REQUEST_ID_LENGTH: usize = 128;

/// Header carrying the request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation ID attached to each request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Fresh random ID
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Accept a client-provided ID if it is safe to log
    pub fn parse(s: &str) -> Option<Self> {
        validate_request_id(s).then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Valid request IDs are non-empty, at most 128 characters, and contain only
/// alphanumerics, hyphens and underscores.
fn validate_request_id(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_REQUEST_ID_LENGTH
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Middleware that generates or extracts request IDs
///
/// The ID is taken from a valid `X-Request-ID` header or freshly generated,
/// stored in request extensions, and echoed on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(RequestId::parse)
        .unwrap_or_else(RequestId::generate);

    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(
            header::HeaderName::from_static(REQUEST_ID_HEADER),
            header_value,
        );
    }

    response
}

/// Error envelope returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Human-readable error
    pub error: String,
    /// Optional guidance for the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Errors returned by HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Invalid JSON in request body")]
    InvalidJson { status: StatusCode, reason: String },

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited { scope: LimitScope, retry_after: u64 },

    /// Multipart upload that could not be read or has no usable file
    #[error("{reason}")]
    InvalidUpload { status: StatusCode, reason: String },
}

impl ApiError {
    /// 400 for an upload that carries no usable file
    pub fn invalid_upload(reason: impl Into<String>) -> Self {
        Self::InvalidUpload {
            status: StatusCode::BAD_REQUEST,
            reason: reason.into(),
        }
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Analysis(err) => analysis_status(err),
            Self::InvalidJson { status, .. } => *status,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::InvalidUpload { status, .. } => *status,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let response = ErrorResponse::new(self.to_string());
        match self {
            Self::Analysis(err) => match err.hint() {
                Some(hint) => response.with_message(hint),
                None => response,
            },
            Self::InvalidJson { reason, .. } => response.with_message(reason.clone()),
            Self::RateLimited { scope, retry_after } => response.with_message(format!(
                "{} quota exhausted. Retry after {retry_after} seconds",
                scope.label()
            )),
            Self::InvalidUpload { .. } => response,
        }
    }
}

fn analysis_status(err: &AnalysisError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if err.is_detector_error() {
        StatusCode::BAD_GATEWAY
    } else if matches!(err, AnalysisError::DetectorUnavailable) {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::InvalidUpload {
            status: rejection.status(),
            reason: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        Self::InvalidUpload {
            status: error.status(),
            reason: error.body_text(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidJson {
            status: rejection.status(),
            reason: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let body = self.to_error_response();

        if status_code.is_server_error() {
            tracing::error!(
                status_code = %status_code,
                error_message = %self,
                detail = ?self,
                "Request failed"
            );
        } else {
            tracing::debug!(
                status_code = %status_code,
                error_message = %self,
                "Request rejected"
            );
        }

        let mut response = (status_code, Json(body)).into_response();

        if let Self::RateLimited { retry_after, .. } = &self {
            if let Ok(header_value) = retry_after.to_string().parse() {
                response.headers_mut().insert(header::RETRY_AFTER, header_value);
            } else {
                tracing::warn!(retry_after, "Failed to build Retry-After header value");
            }
        }

        response
    }
}

/// Result type alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// JSON extractor whose rejections use the error envelope
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
