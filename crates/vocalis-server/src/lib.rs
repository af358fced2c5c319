//! Vocalis HTTP and WebSocket server

pub mod api;
pub mod config;
pub mod static_assets;
pub mod ws;

use api::{ai::*, chat::*, history::*, voice::*};
use axum::{
    Json, Router,
    http::{Method, header},
    routing::{delete, get, post, put},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use vocalis_ai::{ChatResponder, OpenAiSpeech};
use vocalis_core::{AppCore, SharedChatLog};

use crate::api::AppState;
use crate::config::ServerConfig;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    service: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        service: "Vocalis",
    })
}

/// Wire the collaborators described by `config`. API keys come from the environment.
pub fn build_core(config: &ServerConfig) -> AppCore {
    let mut responder = ChatResponder::from_env().with_provider(config.ai.provider);
    if let Some(url) = &config.ai.perplexity_base_url {
        responder = responder.with_perplexity_base_url(url);
    }
    if let Some(url) = &config.ai.openai_base_url {
        responder = responder.with_openai_base_url(url);
    }

    let mut speech = OpenAiSpeech::from_env().with_voice_settings(config.voice);
    if let Some(url) = &config.ai.openai_base_url {
        speech = speech.with_base_url(url);
    }

    AppCore::new(
        SharedChatLog::new(config.history_capacity),
        Arc::new(responder),
        Arc::new(speech),
    )
    .with_max_tokens(config.ai.max_tokens)
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/chat", post(chat))
        // History
        .route("/api/chat-history", get(list_history))
        .route("/api/chat-history/search", get(search_history))
        .route("/api/chat-history/summary", get(history_summary))
        .route("/api/chat-history/{id}", delete(delete_message))
        .route("/api/clear-history", post(clear_history))
        // AI provider
        .route("/api/ai/status", get(ai_status))
        .route("/api/ai/provider", put(set_provider))
        // Voice
        .route(
            "/api/voice/settings",
            get(get_voice_settings).put(update_voice_settings),
        )
        .route("/api/voice/level", post(measure_level))
        .route("/ws", get(ws::ws_handler))
        .fallback(static_assets::static_handler)
        .layer(cors)
        .with_state(state)
}
