use crate::api::{ApiResponse, state::AppState};
use axum::{Json, body::Bytes, extract::State};
use serde::{Deserialize, Serialize};
use vocalis_ai::{VoiceSettings, audio_level};

#[derive(Debug, Deserialize)]
pub struct UpdateVoiceRequest {
    #[serde(default)]
    pub rate: Option<u32>,
    #[serde(default)]
    pub volume: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct AudioLevel {
    pub level: f32,
}

// GET /api/voice/settings
pub async fn get_voice_settings(State(state): State<AppState>) -> Json<ApiResponse<VoiceSettings>> {
    Json(ApiResponse::ok(state.speech.voice_settings()))
}

// PUT /api/voice/settings
pub async fn update_voice_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateVoiceRequest>,
) -> Json<ApiResponse<VoiceSettings>> {
    let current = state.speech.voice_settings();
    let applied = state.speech.set_voice_properties(
        request.rate.unwrap_or(current.rate),
        request.volume.unwrap_or(current.volume),
    );
    Json(ApiResponse::ok(applied))
}

// POST /api/voice/level
pub async fn measure_level(body: Bytes) -> Json<ApiResponse<AudioLevel>> {
    Json(ApiResponse::ok(AudioLevel {
        level: audio_level(&body),
    }))
}
