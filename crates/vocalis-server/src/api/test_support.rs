//! Collaborator doubles and request helpers for router tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;
use vocalis_ai::{
    AiProvider, Reply, ReplySource, Responder, ResponderError, SpeechError, SpeechTranscoder,
    VoiceSettings,
};
use vocalis_core::{AppCore, SharedChatLog};

use crate::build_router;

pub struct StubResponder {
    failure: Option<ResponderError>,
    openai: AtomicBool,
}

impl StubResponder {
    pub fn ok() -> Self {
        Self {
            failure: None,
            openai: AtomicBool::new(false),
        }
    }

    pub fn failing(error: ResponderError) -> Self {
        Self {
            failure: Some(error),
            openai: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Responder for StubResponder {
    fn provider(&self) -> &str {
        if self.openai.load(Ordering::SeqCst) {
            "openai"
        } else {
            "perplexity"
        }
    }

    async fn respond(&self, text: &str, _max_tokens: u32) -> Result<Reply, ResponderError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(Reply {
                text: format!("echo: {}", text),
                source: ReplySource::Provider(AiProvider::Perplexity),
            }),
        }
    }

    fn set_provider(&self, name: &str) -> bool {
        match name.parse::<AiProvider>() {
            Ok(provider) => {
                self.openai
                    .store(provider == AiProvider::OpenAi, Ordering::SeqCst);
                true
            }
            Err(_) => false,
        }
    }
}

pub const STUB_TRANSCRIPT: &str = "what's the weather";
pub const STUB_AUDIO: &[u8] = b"RIFF-stub-audio";

#[derive(Default)]
pub struct StubSpeech {
    settings: Mutex<VoiceSettings>,
}

#[async_trait]
impl SpeechTranscoder for StubSpeech {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, SpeechError> {
        if audio.is_empty() {
            Err(SpeechError::Unrecognized)
        } else {
            Ok(STUB_TRANSCRIPT.to_string())
        }
    }

    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, SpeechError> {
        Ok(STUB_AUDIO.to_vec())
    }

    fn voice_settings(&self) -> VoiceSettings {
        *self.settings.lock().unwrap()
    }

    fn set_voice_properties(&self, rate: u32, volume: f32) -> VoiceSettings {
        let settings = VoiceSettings::new(rate, volume);
        *self.settings.lock().unwrap() = settings;
        settings
    }
}

pub fn core_with(responder: StubResponder) -> Arc<AppCore> {
    Arc::new(AppCore::new(
        SharedChatLog::new(10),
        Arc::new(responder),
        Arc::new(StubSpeech::default()),
    ))
}

pub fn test_state() -> Arc<AppCore> {
    core_with(StubResponder::ok())
}

pub fn app(state: Arc<AppCore>) -> Router {
    build_router(state)
}

/// Send one request through a fresh router and decode the JSON body.
pub async fn send(state: &Arc<AppCore>, request: Request<Body>) -> (StatusCode, Value) {
    let response = app(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
