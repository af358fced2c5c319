use crate::api::{ApiResponse, ApiResult, api_error, state::AppState};
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vocalis_ai::ResponderError;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub id: u64,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

fn reply_status(error: &ResponderError) -> StatusCode {
    match error {
        ResponderError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::BAD_GATEWAY,
    }
}

// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatReply> {
    if request.message.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Message is required"));
    }

    let turn = state.chat(&request.message).await;
    match turn.reply {
        Ok(reply) => Ok(Json(ApiResponse::ok(ChatReply {
            id: turn.message.id,
            response: reply.text,
            timestamp: turn.message.timestamp,
        }))),
        Err(err) => {
            tracing::error!(error = %err, "Error in chat");
            Err(api_error(reply_status(&err), err.to_string()))
        }
    }
}
