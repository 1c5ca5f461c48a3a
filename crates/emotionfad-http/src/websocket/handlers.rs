//! WebSocket connection handling and event dispatch

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde_json::{Value, json};
use std::net::SocketAddr;
use tracing::{debug, error, info, warn};

use super::{
    protocol::{ClientEvent, ProtocolError, WsEnvelope, server_events},
    registry::{ClientId, StreamKind},
};
use crate::runtime::AppState;

const ANALYZER_NOT_INITIALIZED: &str = "Emotion analyzer not initialized";

/// What to do after handling one client frame
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Send(WsEnvelope),
    Close,
}

/// GET /ws - WebSocket upgrade handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    debug!(%addr, "WebSocket upgrade request");

    // Check connection limits before upgrade
    if state.clients.is_full() {
        warn!(
            %addr,
            max_connections = state.clients.max_connections(),
            "WebSocket connection limit exceeded"
        );
        return (StatusCode::TOO_MANY_REQUESTS, "Connection limit exceeded").into_response();
    }

    let max_message_size = state.config.websocket.max_message_size;
    ws.max_message_size(max_message_size)
        .max_frame_size(max_message_size)
        .on_upgrade(move |socket| handle_connection(socket, addr, state))
}

async fn handle_connection(socket: WebSocket, addr: SocketAddr, state: AppState) {
    let client_id = match state.clients.register(Some(addr)) {
        Ok(id) => id,
        Err(e) => {
            warn!(%addr, error = %e, "Rejecting WebSocket client");
            return;
        }
    };
    info!(%client_id, %addr, "Client connected");

    let (mut sender, mut receiver) = socket.split();

    let welcome = WsEnvelope::new(
        server_events::CONNECTION_RESPONSE,
        json!({
            "status": "connected",
            "client_id": client_id,
            "analyzer_ready": state.system.detector_ready(),
        }),
    );

    if send_envelope(&mut sender, &welcome).await {
        while let Some(msg) = receiver.next().await {
            let reply = match msg {
                Ok(Message::Text(text)) => handle_text(&state, client_id, text.as_str()).await,
                Ok(Message::Binary(_)) => {
                    Reply::Send(WsEnvelope::error(ProtocolError::BinaryNotSupported.to_string()))
                }
                Ok(Message::Close(_)) => {
                    debug!(%client_id, "Connection closed by client");
                    break;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
                Err(e) => {
                    warn!(%client_id, error = %e, "WebSocket receive error");
                    break;
                }
            };

            match reply {
                Reply::Send(envelope) => {
                    if !send_envelope(&mut sender, &envelope).await {
                        break;
                    }
                }
                Reply::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    } else {
        warn!(%client_id, "Failed to send connection response");
    }

    state.clients.remove(&client_id);
    info!(%client_id, "Client disconnected");
}

/// Serialize and send one frame; false when the socket is gone
async fn send_envelope(sender: &mut SplitSink<WebSocket, Message>, envelope: &WsEnvelope) -> bool {
    match envelope.to_json() {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            error!(event = %envelope.event, error = %e, "Failed to serialize WebSocket frame");
            true
        }
    }
}

/// Handle one text frame from `client_id`
pub async fn handle_text(state: &AppState, client_id: ClientId, text: &str) -> Reply {
    let event = match WsEnvelope::parse(text).and_then(ClientEvent::try_from) {
        Ok(event) => event,
        Err(e) => {
            debug!(%client_id, error = %e, "Rejected client frame");
            return Reply::Send(WsEnvelope::error(e.to_string()));
        }
    };
    dispatch(state, client_id, event).await
}

/// Handle one parsed client event
pub async fn dispatch(state: &AppState, client_id: ClientId, event: ClientEvent) -> Reply {
    let success = || json!({ "status": "success" });

    let envelope = match event {
        ClientEvent::StartVideo => {
            state.clients.set_stream(&client_id, StreamKind::Video);
            info!(%client_id, "Video stream started");
            WsEnvelope::new(server_events::VIDEO_STARTED, success())
        }
        ClientEvent::StartAudio => {
            state.clients.set_stream(&client_id, StreamKind::Audio);
            info!(%client_id, "Audio stream started");
            WsEnvelope::new(server_events::AUDIO_STARTED, success())
        }
        ClientEvent::StartAnalysis => {
            if state.system.detector_ready() {
                info!(%client_id, "Analysis started");
                WsEnvelope::new(server_events::ANALYSIS_STARTED, success())
            } else {
                WsEnvelope::analysis_error(ANALYZER_NOT_INITIALIZED)
            }
        }
        ClientEvent::VideoFrame { frame } => video_frame(state, client_id, frame).await,
        ClientEvent::ChatMessage { text } => chat_message(state, client_id, text),
        ClientEvent::AudioData(data) => WsEnvelope::new(server_events::PROCESSED_AUDIO, data),
        ClientEvent::Message(data) => {
            let text = match data {
                Value::String(s) => s,
                other => other.to_string(),
            };
            WsEnvelope::new(
                server_events::RESPONSE,
                json!({ "data": format!("Message received: {text}") }),
            )
        }
        ClientEvent::Disconnect => {
            debug!(%client_id, "Client requested disconnect");
            return Reply::Close;
        }
    };

    Reply::Send(envelope)
}

async fn video_frame(state: &AppState, client_id: ClientId, frame: Option<String>) -> WsEnvelope {
    if !state.system.detector_ready() {
        return WsEnvelope::analysis_error(ANALYZER_NOT_INITIALIZED);
    }

    let result = match frame {
        Some(frame) => state.system.analyze_frame(&frame).await,
        None => Err(emotionfad_core::AnalysisError::MissingImage),
    };

    match result.map(|analysis| serde_json::to_value(&analysis)) {
        Ok(Ok(analysis)) => WsEnvelope::new(server_events::ANALYSIS_RESULT, analysis),
        Ok(Err(e)) => {
            error!(%client_id, error = %e, "Failed to serialize frame analysis");
            WsEnvelope::analysis_error(format!("Error processing video frame: {e}"))
        }
        Err(e) => {
            warn!(%client_id, error = %e, "Video frame analysis failed");
            WsEnvelope::analysis_error(format!("Error processing video frame: {e}"))
        }
    }
}

fn chat_message(state: &AppState, client_id: ClientId, text: Option<String>) -> WsEnvelope {
    let result = state
        .system
        .analyze_text(text.as_deref().unwrap_or_default())
        .map(|analysis| serde_json::to_value(&analysis));

    match result {
        Ok(Ok(analysis)) => WsEnvelope::new(server_events::TEXT_ANALYSIS, analysis),
        Ok(Err(e)) => {
            error!(%client_id, error = %e, "Failed to serialize text analysis");
            WsEnvelope::analysis_error(e.to_string())
        }
        Err(e) => WsEnvelope::analysis_error(e.to_string()),
    }
}
