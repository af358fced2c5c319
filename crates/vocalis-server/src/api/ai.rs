use crate::api::{ApiResponse, ApiResult, api_error, state::AppState};
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct AiStatus {
    pub provider: String,
    pub connected: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetProviderRequest {
    pub provider: String,
}

// GET /api/ai/status
pub async fn ai_status(State(state): State<AppState>) -> Json<ApiResponse<AiStatus>> {
    let connected = state.responder.test_connection().await;
    Json(ApiResponse::ok(AiStatus {
        provider: state.responder.provider().to_string(),
        connected,
    }))
}

// PUT /api/ai/provider
pub async fn set_provider(
    State(state): State<AppState>,
    Json(request): Json<SetProviderRequest>,
) -> ApiResult<String> {
    if state.responder.set_provider(&request.provider) {
        Ok(Json(ApiResponse::ok(state.responder.provider().to_string())))
    } else {
        Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid AI provider: {}", request.provider),
        ))
    }
}
