//! WebSocket protocol definitions
//!
//! Every frame is a JSON text message `{"event": <name>, "data": <json>}`
//! in both directions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event names sent by clients
pub mod client_events {
    pub const START_VIDEO: &str = "start_video";
    pub const START_AUDIO: &str = "start_audio";
    pub const START_ANALYSIS: &str = "start_analysis";
    pub const VIDEO_FRAME: &str = "video_frame";
    pub const CHAT_MESSAGE: &str = "chat_message";
    pub const AUDIO_DATA: &str = "audio_data";
    pub const MESSAGE: &str = "message";
    pub const DISCONNECT: &str = "disconnect";
}

/// Event names sent by the server
pub mod server_events {
    pub const CONNECTION_RESPONSE: &str = "connection_response";
    pub const VIDEO_STARTED: &str = "video_started";
    pub const AUDIO_STARTED: &str = "audio_started";
    pub const ANALYSIS_STARTED: &str = "analysis_started";
    pub const ANALYSIS_RESULT: &str = "analysis_result";
    pub const ANALYSIS_ERROR: &str = "analysis_error";
    pub const TEXT_ANALYSIS: &str = "text_analysis";
    pub const PROCESSED_AUDIO: &str = "processed_audio";
    pub const RESPONSE: &str = "response";
    pub const ERROR: &str = "error";
}

/// Wire frame shared by both directions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl WsEnvelope {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// `error {error}` frame
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(
            server_events::ERROR,
            serde_json::json!({ "error": message.into() }),
        )
    }

    /// `analysis_error {error}` frame
    pub fn analysis_error(message: impl Into<String>) -> Self {
        Self::new(
            server_events::ANALYSIS_ERROR,
            serde_json::json!({ "error": message.into() }),
        )
    }

    /// Parse a text frame
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Errors raised while interpreting a client frame
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Invalid message format: {0}")]
    Malformed(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Binary messages are not supported")]
    BinaryNotSupported,
}

/// A recognised client event
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    StartVideo,
    StartAudio,
    StartAnalysis,
    VideoFrame { frame: Option<String> },
    ChatMessage { text: Option<String> },
    AudioData(Value),
    Message(Value),
    Disconnect,
}

impl TryFrom<WsEnvelope> for ClientEvent {
    type Error = ProtocolError;

    fn try_from(envelope: WsEnvelope) -> Result<Self, Self::Error> {
        use client_events::*;

        let event = match envelope.event.as_str() {
            START_VIDEO => Self::StartVideo,
            START_AUDIO => Self::StartAudio,
            START_ANALYSIS => Self::StartAnalysis,
            VIDEO_FRAME => Self::VideoFrame {
                frame: string_field(&envelope.data, "frame"),
            },
            CHAT_MESSAGE => Self::ChatMessage {
                text: string_field(&envelope.data, "text"),
            },
            AUDIO_DATA => Self::AudioData(envelope.data),
            MESSAGE => Self::Message(envelope.data),
            DISCONNECT => Self::Disconnect,
            _ => return Err(ProtocolError::UnknownEvent(envelope.event)),
        };
        Ok(event)
    }
}

/// `data.<key>` as a string; a bare string payload also counts
fn string_field(data: &Value, key: &str) -> Option<String> {
    match data {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get(key).and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}
