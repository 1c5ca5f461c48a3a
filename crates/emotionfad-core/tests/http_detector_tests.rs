//! HttpEmotionDetector against a mock model server

use emotionfad_core::{
    AnalysisError, DecodedFrame, DetectorConfig, Emotion, EmotionDetector, FraudDetectionSystem,
    HttpEmotionDetector,
};
use image::{DynamicImage, RgbImage};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn frame() -> DecodedFrame {
    let mut jpeg = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(32, 32))
        .write_to(&mut jpeg, image::ImageFormat::Jpeg)
        .unwrap();
    DecodedFrame::from_bytes(jpeg.into_inner(), 1024 * 1024).unwrap()
}

fn detector(server: &MockServer) -> HttpEmotionDetector {
    HttpEmotionDetector::new(
        DetectorConfig::new(server.uri()).with_timeout(Duration::from_millis(500)),
    )
    .unwrap()
}

fn happy_face() -> serde_json::Value {
    json!({
        "emotion": {
            "angry": 1.0, "disgust": 0.0, "fear": 2.0, "happy": 90.0,
            "sad": 1.0, "surprise": 3.0, "neutral": 3.0
        },
        "dominant_emotion": "happy",
        "region": {"x": 10, "y": 20, "w": 120, "h": 130},
        "face_confidence": 0.97
    })
}

#[tokio::test]
async fn test_detect_parses_wrapped_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(body_partial_json(json!({
            "actions": ["emotion"],
            "enforce_detection": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [happy_face()]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let faces = detector(&server).detect(&frame()).await.unwrap();

    assert_eq!(faces.len(), 1);
    assert_eq!(faces[0].region.w, 120);
    assert_eq!(faces[0].emotions.dominant().0, Emotion::Happy);
    assert_eq!(faces[0].face_confidence, Some(0.97));
}

#[tokio::test]
async fn test_detect_parses_bare_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([happy_face(), happy_face()])))
        .mount(&server)
        .await;

    let faces = detector(&server).detect(&frame()).await.unwrap();
    assert_eq!(faces.len(), 2);
}

#[tokio::test]
async fn test_error_status_maps_to_detector_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&server)
        .await;

    let err = detector(&server).detect(&frame()).await.unwrap_err();
    match err {
        AnalysisError::DetectorFailed { message } => {
            assert!(message.contains("500"), "{message}");
            assert!(message.contains("model crashed"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_garbage_body_maps_to_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = detector(&server).detect(&frame()).await.unwrap_err();
    assert!(matches!(err, AnalysisError::DetectorProtocol { .. }));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = detector(&server).detect(&frame()).await.unwrap_err();
    assert!(matches!(err, AnalysisError::DetectorTimeout { .. }));
    assert!(err.is_detector_error());
}

#[tokio::test]
async fn test_system_reports_no_face_from_empty_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let system = FraudDetectionSystem::new(Arc::new(detector(&server)));
    let image = frame().to_data_url();

    let err = system.analyze_facial(&image).await.unwrap_err();
    assert!(matches!(err, AnalysisError::NoFaceDetected));
    assert!(err.hint().is_some());

    let frame_analysis = system.analyze_frame(&image).await.unwrap();
    assert_eq!(frame_analysis.faces_detected, 0);
}
