//! One-shot analysis commands

use base64::{Engine, engine::general_purpose::STANDARD};
use emotionfad_core::{AnalyzerConfig, FraudDetectionSystem};
use emotionfad_http::{AppState, ServerConfigBuilder};
use std::path::Path;
use tracing::info;

use crate::CliError;

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run_analyze_text(text: &str, threshold: Option<f64>) -> Result<(), CliError> {
    let mut builder = ServerConfigBuilder::from_env()?;
    if let Some(threshold) = threshold {
        builder = builder.fraud_threshold(threshold);
    }
    let config = builder.build()?;

    let system = FraudDetectionSystem::default().with_config(AnalyzerConfig {
        fraud_threshold: config.fraud_threshold,
        ..AnalyzerConfig::default()
    });
    let analysis = system.analyze_text(text)?;
    print_json(&analysis)
}

pub async fn run_analyze_image(
    path: &Path,
    detector_url: Option<String>,
    all_faces: bool,
    text: Option<&str>,
) -> Result<(), CliError> {
    let mut builder = ServerConfigBuilder::from_env()?;
    if let Some(url) = detector_url {
        builder = builder.detector_url(url);
    }
    let state = AppState::from_config(builder.build()?)?;

    let bytes = std::fs::read(path)?;
    info!(path = %path.display(), bytes = bytes.len(), "Analyzing image");
    let image = STANDARD.encode(&bytes);

    if all_faces {
        let frame = state.system.analyze_frame(&image).await?;
        return print_json(&frame);
    }

    let facial = state.system.analyze_facial(&image).await?;
    match text {
        Some(text) => {
            let text_analysis = state.system.analyze_text(text)?;
            let report = state
                .system
                .generate_report(Some(&facial), Some(&text_analysis));
            print_json(&report)
        }
        None => print_json(&facial),
    }
}

pub fn run_check() -> Result<(), CliError> {
    let config = ServerConfigBuilder::from_env()?.build()?;

    print_json(&serde_json::json!({
        "status": "ok",
        "bind_address": config.bind_address(),
        "request_timeout_secs": config.request_timeout_secs,
        "max_body_size": config.max_body_size,
        "enable_cors": config.enable_cors,
        "enable_openapi": config.enable_openapi,
        "fraud_threshold": config.fraud_threshold,
        "annotate_frames": config.annotate_frames,
        "detector_url": config.detector.url,
        "detector_timeout_secs": config.detector.timeout_secs,
        "rate_limit": {
            "global_rpm": config.rate_limit.global_rpm,
            "per_ip_rpm": config.rate_limit.per_ip_rpm,
        },
        "websocket": {
            "max_connections": config.websocket.max_connections,
            "max_message_size": config.websocket.max_message_size,
        },
    }))
}
