//! API documentation handlers
//!
//! Serves the OpenAPI document generated from the handler annotations.

use axum::response::Json;
use utoipa::OpenApi;

use crate::runtime::{
    error::ErrorResponse,
    handlers::{ComprehensiveRequest, ImageRequest, ImageUploadForm, TextRequest},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::runtime::handlers::health_check,
        crate::runtime::handlers::readiness_check,
        crate::runtime::handlers::analyze_facial,
        crate::runtime::handlers::analyze_text,
        crate::runtime::handlers::analyze_comprehensive,
        crate::runtime::handlers::analyze_frame
    ),
    components(
        schemas(
            ImageRequest,
            ImageUploadForm,
            TextRequest,
            ComprehensiveRequest,
            ErrorResponse
        )
    ),
    tags(
        (name = "analysis", description = "Facial, text and combined fraud analysis"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "EmotionFAD API",
        description = "Fraud activity detection from facial emotion and chat sentiment"
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    )
)]
struct ApiDoc;

/// Generated OpenAPI document
pub fn api_doc() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// GET /api-docs/openapi.json - OpenAPI specification endpoint
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(api_doc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_analysis_paths() {
        let doc = api_doc();
        for path in [
            "/health",
            "/ready",
            "/analyze/facial",
            "/analyze/text",
            "/analyze/comprehensive",
            "/api/analyze",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_frame_route_documents_both_body_types() {
        let doc = serde_json::to_value(api_doc()).unwrap();
        let content = &doc["paths"]["/api/analyze"]["post"]["requestBody"]["content"];
        assert!(content["application/json"].is_object());
        assert!(content["multipart/form-data"].is_object());
    }
}
