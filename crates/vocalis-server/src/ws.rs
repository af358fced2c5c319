//! Real-time voice channel.
//!
//! Every text frame is a JSON envelope `{"event": ..., "data": {...}}`.
//! Binary frames are treated as raw audio. A bad frame gets an `error`
//! event back and the socket stays open.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use vocalis_ai::SpeechError;
use vocalis_core::TurnError;

use crate::api::AppState;

pub const GREETING: &str = "Connected to Vocalis";

#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    AudioStream { audio: String },
    Chat { message: String },
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub text: String,
    /// Base64 WAV
    pub audio: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ConnectionResponse { data: String },
    Response(TurnResponse),
    Error { message: String },
}

impl ServerEvent {
    fn connected() -> Self {
        ServerEvent::ConnectionResponse {
            data: GREETING.to_string(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }
}

// GET /ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    info!("Client connected");

    if send_event(&mut socket, &ServerEvent::connected()).await.is_err() {
        return;
    }

    while let Some(frame) = socket.recv().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                debug!("WebSocket receive error: {}", err);
                break;
            }
        };

        let reply = match frame {
            Message::Text(text) => handle_text(&state, text.as_str()).await,
            Message::Binary(audio) => voice_event(&state, &audio).await,
            Message::Ping(_) | Message::Pong(_) => continue,
            Message::Close(_) => break,
        };

        if let Err(err) = send_event(&mut socket, &reply).await {
            debug!("WebSocket send error: {}", err);
            break;
        }
    }

    info!("Client disconnected");
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(err) => {
            error!("Failed to encode event: {}", err);
            Ok(())
        }
    }
}

/// Handle one text frame and produce the event to send back.
pub async fn handle_text(state: &AppState, text: &str) -> ServerEvent {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(err) => {
            warn!("Malformed WebSocket frame: {}", err);
            return ServerEvent::error(format!("Invalid message: {}", err));
        }
    };

    match event {
        ClientEvent::AudioStream { audio } => match decode_audio(&audio) {
            Ok(bytes) => voice_event(state, &bytes).await,
            Err(err) => {
                warn!("Undecodable audio payload: {}", err);
                ServerEvent::error("Invalid audio data")
            }
        },
        ClientEvent::Chat { message } => chat_event(state, &message).await,
    }
}

async fn chat_event(state: &AppState, message: &str) -> ServerEvent {
    if message.is_empty() {
        return ServerEvent::error("Message is required");
    }

    let turn = state.chat(message).await;
    match turn.reply {
        Ok(reply) => ServerEvent::Response(TurnResponse {
            text: reply.text,
            audio: None,
            timestamp: turn.message.timestamp,
            transcript: None,
        }),
        Err(err) => ServerEvent::error(err.to_string()),
    }
}

async fn voice_event(state: &AppState, audio: &[u8]) -> ServerEvent {
    match state.voice_turn(audio).await {
        Ok(turn) => ServerEvent::Response(TurnResponse {
            text: turn.reply.text,
            audio: turn.audio.map(|audio| STANDARD.encode(audio)),
            timestamp: turn.message.timestamp,
            transcript: Some(turn.transcript),
        }),
        Err(TurnError::Transcription(SpeechError::Unrecognized)) => {
            ServerEvent::error("Could not understand audio")
        }
        Err(err) => {
            error!("Error processing audio: {}", err);
            ServerEvent::error(err.to_string())
        }
    }
}

/// Accepts bare base64 or a `data:<mime>;base64,` URL.
fn decode_audio(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let encoded = payload
        .split_once(";base64,")
        .map_or(payload, |(_, data)| data);
    STANDARD.decode(encoded.trim())
}
