//! Integration tests for the analysis endpoints
//!
//! Drives the full router, middleware included, with in-process detectors.

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use emotionfad_core::{
    Emotion, EmotionDetector, FraudDetectionSystem, UnavailableDetector,
    testing::{FailingDetector, FixedDetector, sample_jpeg, sample_jpeg_base64},
};
use emotionfad_http::runtime::{
    AppState, RateLimitConfig, ServerConfig, ServerConfigBuilder, create_router,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(detector: Arc<dyn EmotionDetector>, config: ServerConfig) -> axum::Router {
    let system = FraudDetectionSystem::new(detector).with_config(config.analyzer_config());
    create_router(AppState::new(system, config))
}

/// Helper to create test app with a detector that sees one fearful face
fn create_test_app() -> axum::Router {
    let detector = FixedDetector::single(&[(Emotion::Fear, 80.0), (Emotion::Neutral, 20.0)]);
    app_with(Arc::new(detector), ServerConfig::default())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let response = create_test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;

    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "EmotionFAD - Fraud Activity Detection");
    assert!(json["version"].is_string());
    assert!(json["uptime_seconds"].is_number());
    assert!(json["timestamp"].is_string());
    assert_eq!(json["analyzer_ready"], true);
    assert_eq!(json["connected_clients"], 0);
}

#[tokio::test]
async fn test_ready_endpoint_reflects_detector() {
    let app = app_with(Arc::new(UnavailableDetector), ServerConfig::default());
    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = read_json(response).await;
    assert_eq!(json["status"], "not_ready");
    assert_eq!(json["components"]["emotion_detector"]["ready"], false);
}

#[tokio::test]
async fn test_facial_analysis_success() {
    let response = create_test_app()
        .oneshot(post_json(
            "/analyze/facial",
            json!({ "image": format!("data:image/jpeg;base64,{}", sample_jpeg_base64()) }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;

    assert_eq!(json["success"], true);
    assert_eq!(json["dominant_emotion"], "fear");
    assert_eq!(json["emotions"]["fear"], 80.0);
    // (80 * 0.9 + 20 * 0.1) / 100
    assert!((json["stress_level"].as_f64().unwrap() - 0.74).abs() < 1e-9);
    assert!((json["deception_risk"].as_f64().unwrap() - 0.32).abs() < 1e-9);
}

#[tokio::test]
async fn test_facial_analysis_missing_image() {
    let response = create_test_app()
        .oneshot(post_json("/analyze/facial", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "No image data provided");
}

#[tokio::test]
async fn test_facial_analysis_rejects_non_image() {
    // "hello world" is valid base64 of text, not an image
    let response = create_test_app()
        .oneshot(post_json(
            "/analyze/facial",
            json!({ "image": "aGVsbG8gd29ybGQ=" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert_eq!(json["error"], "Failed to decode image");
}

#[tokio::test]
async fn test_facial_analysis_no_face_carries_hint() {
    let app = app_with(Arc::new(FixedDetector::empty()), ServerConfig::default());
    let response = app
        .oneshot(post_json(
            "/analyze/facial",
            json!({ "image": sample_jpeg_base64() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert_eq!(json["error"], "No face detected");
    assert!(
        json["message"]
            .as_str()
            .unwrap()
            .starts_with("Could not detect face")
    );
}

#[tokio::test]
async fn test_facial_analysis_without_detector_is_unavailable() {
    let app = app_with(Arc::new(UnavailableDetector), ServerConfig::default());
    let response = app
        .oneshot(post_json(
            "/analyze/facial",
            json!({ "image": sample_jpeg_base64() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = read_json(response).await;
    assert_eq!(json["error"], "Emotion analyzer not initialized");
}

#[tokio::test]
async fn test_detector_failure_maps_to_bad_gateway() {
    let app = app_with(Arc::new(FailingDetector), ServerConfig::default());
    let response = app
        .oneshot(post_json(
            "/analyze/facial",
            json!({ "image": sample_jpeg_base64() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_text_analysis_success() {
    let response = create_test_app()
        .oneshot(post_json(
            "/analyze/text",
            json!({ "text": "Send me your bank account and password, this is urgent" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;

    assert_eq!(json["success"], true);
    let keywords: Vec<&str> = json["fraud_keywords_found"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(keywords.contains(&"password"));
    assert!(keywords.contains(&"bank account"));
    let risk = json["fraud_risk_score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&risk));
}

#[tokio::test]
async fn test_text_analysis_missing_text() {
    for body in [json!({}), json!({ "text": "   " })] {
        let response = create_test_app()
            .oneshot(post_json("/analyze/text", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = read_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "No text provided");
    }
}

#[tokio::test]
async fn test_comprehensive_from_raw_inputs() {
    let response = create_test_app()
        .oneshot(post_json(
            "/analyze/comprehensive",
            json!({
                "image": sample_jpeg_base64(),
                "text": "Pay with bitcoin now",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;

    assert_eq!(json["success"], true);
    assert!(json["facial_analysis"].is_object());
    assert!(json["text_analysis"].is_object());
    let factors: Vec<&str> = json["risk_factors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(factors.contains(&"Elevated stress levels detected"));
    assert!(
        factors
            .iter()
            .any(|f| f.starts_with("Fraud-related keywords detected: ") && f.contains("bitcoin"))
    );
    let score = json["overall_risk_score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&score));
}

#[tokio::test]
async fn test_comprehensive_prefers_successful_prior_results() {
    let prior_text = json!({
        "success": true,
        "text": "earlier message",
        "sentiment_polarity": 0.0,
        "sentiment_subjectivity": 0.0,
        "sentiment_category": "neutral",
        "fraud_keywords_found": ["scam", "fraud", "hack", "steal"],
        "suspicious_patterns_count": 1,
        "suspicious_patterns_found": ["secrecy"],
        "fraud_risk_score": 1.0,
        "is_suspicious": true
    });

    let response = create_test_app()
        .oneshot(post_json(
            "/analyze/comprehensive",
            json!({ "text_data": prior_text, "text": "hello there" }),
        ))
        .await
        .unwrap();

    let json = read_json(response).await;
    assert_eq!(json["text_analysis"]["text"], "earlier message");
    assert_eq!(json["overall_risk_score"], 0.5);
    assert_eq!(json["risk_level"], "MEDIUM");
    assert!(
        json["risk_factors"]
            .as_array()
            .unwrap()
            .contains(&json!("Fraud-related keywords detected: scam, fraud, hack"))
    );
    assert!(json["facial_analysis"].is_null());
}

#[tokio::test]
async fn test_comprehensive_ignores_failed_prior_result() {
    let response = create_test_app()
        .oneshot(post_json(
            "/analyze/comprehensive",
            json!({
                "facial_data": { "success": false, "error": "No face detected" },
                "text": "hello there"
            }),
        ))
        .await
        .unwrap();

    let json = read_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json["facial_analysis"].is_null());
    assert_eq!(json["text_analysis"]["text"], "hello there");
}

#[tokio::test]
async fn test_comprehensive_empty_request_is_low_risk() {
    let response = create_test_app()
        .oneshot(post_json("/analyze/comprehensive", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["overall_risk_score"], 0.0);
    assert_eq!(json["risk_level"], "LOW");
    assert_eq!(
        json["recommendation"],
        "✅ Low fraud risk. Continue normal interaction."
    );
}

#[tokio::test]
async fn test_frame_analysis_reports_every_face() {
    let response = create_test_app()
        .oneshot(post_json("/api/analyze", json!({ "image": sample_jpeg_base64() })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["faces_detected"], 1);
    assert_eq!(json["analysis"][0]["dominant_emotion"], "fear");
    assert_eq!(json["analysis"][0]["box"]["w"], 100);
}

const BOUNDARY: &str = "emotionfad-test-boundary";

/// Single-field multipart body; `file_name` of `None` sends a plain form value
fn post_multipart(field: &str, file_name: Option<&str>, content: &[u8]) -> Request<Body> {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\nContent-Type: image/jpeg\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_frame_analysis_json_returns_annotated_frame() {
    let response = create_test_app()
        .oneshot(post_json("/api/analyze", json!({ "image": sample_jpeg_base64() })))
        .await
        .unwrap();

    let json = read_json(response).await;
    assert!(
        json["frame_with_boxes"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,")
    );
}

#[tokio::test]
async fn test_frame_analysis_accepts_file_upload() {
    let response = create_test_app()
        .oneshot(post_multipart("image", Some("frame.jpg"), &sample_jpeg(64, 48)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["faces_detected"], 1);
    assert_eq!(json["analysis"][0]["dominant_emotion"], "fear");
    assert!(
        json["frame_with_boxes"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,")
    );
}

#[tokio::test]
async fn test_frame_upload_without_selected_file() {
    let response = create_test_app()
        .oneshot(post_multipart("image", Some(""), b""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "No selected file");
}

#[tokio::test]
async fn test_frame_upload_without_image_field() {
    let response = create_test_app()
        .oneshot(post_multipart("attachment", Some("frame.jpg"), &sample_jpeg(8, 8)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert_eq!(json["error"], "No image data provided");
}

#[tokio::test]
async fn test_frame_upload_with_corrupt_file() {
    let mut corrupt = vec![0xFF, 0xD8, 0xFF, 0xE0];
    corrupt.extend_from_slice(&[0x42; 64]);
    let response = create_test_app()
        .oneshot(post_multipart("image", Some("frame.jpg"), &corrupt))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert_eq!(json["error"], "Failed to decode image");
}

#[tokio::test]
async fn test_frame_upload_as_form_value() {
    let response = create_test_app()
        .oneshot(post_multipart("image", None, sample_jpeg_base64().as_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["faces_detected"], 1);
}

#[tokio::test]
async fn test_invalid_json_uses_error_envelope() {
    let response = create_test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/analyze/text")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Invalid JSON in request body");
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_missing_content_type_keeps_rejection_status() {
    let response = create_test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/analyze/text")
                .body(Body::from(r#"{"text":"hi"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let json = read_json(response).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_request_id_generated_and_echoed() {
    let response = create_test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 36);

    let response = create_test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "client-trace_42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "client-trace_42");

    let response = create_test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "bad id with spaces")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_ne!(response.headers()["x-request-id"], "bad id with spaces");
}

#[tokio::test]
async fn test_global_rate_limit_returns_429() {
    let config = ServerConfigBuilder::new()
        .rate_limit(RateLimitConfig {
            global_rpm: 1,
            per_ip_rpm: 10,
        })
        .build()
        .unwrap();
    let app = app_with(Arc::new(FixedDetector::empty()), config);

    let first = app
        .clone()
        .oneshot(post_json("/analyze/text", json!({ "text": "hello" })))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .clone()
        .oneshot(post_json("/analyze/text", json!({ "text": "hello" })))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(second.headers().contains_key(header::RETRY_AFTER));
    let json = read_json(second).await;
    assert_eq!(json["error"], "Rate limit exceeded. Please try again later.");

    // Health checks are not rate limited
    let health = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_body_limit_enforced() {
    let config = ServerConfigBuilder::new()
        .max_body_size(1024)
        .build()
        .unwrap();
    let app = app_with(Arc::new(FixedDetector::empty()), config);

    let response = app
        .oneshot(post_json(
            "/analyze/text",
            json!({ "text": "a".repeat(4096) }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_openapi_document_served_when_enabled() {
    let response = create_test_app()
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert!(json["paths"]["/analyze/comprehensive"].is_object());

    let config = ServerConfigBuilder::new()
        .enable_openapi(false)
        .build()
        .unwrap();
    let response = app_with(Arc::new(FixedDetector::empty()), config)
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
