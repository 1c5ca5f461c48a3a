//! Health and readiness handlers

use axum::{extract::State, http::StatusCode, response::Json};

use crate::runtime::AppState;

/// Service name reported by `/health`
pub const SERVICE_NAME: &str = "EmotionFAD - Fraud Activity Detection";

/// GET /health - Basic health check endpoint with version info
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.uptime_seconds(),
        "analyzer_ready": state.system.detector_ready(),
        "connected_clients": state.connected_clients(),
    }))
}

/// GET /ready - Readiness check; facial analysis needs a detector
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Emotion detector is available", body = serde_json::Value),
        (status = 503, description = "No emotion detector configured", body = serde_json::Value)
    )
)]
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<serde_json::Value>) {
    let ready = state.system.detector_ready();
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "timestamp": chrono::Utc::now(),
            "components": {
                "emotion_detector": {
                    "name": state.system.detector_name(),
                    "ready": ready,
                },
                "text_analyzer": { "ready": true },
            },
        })),
    )
}
