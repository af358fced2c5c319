use crate::api::{ApiResponse, ApiResult, api_error, state::AppState};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use vocalis_core::{ChatMessage, ChatSummary};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

// GET /api/chat-history
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Json<ApiResponse<Vec<ChatMessage>>> {
    let messages = match (query.limit, query.offset) {
        (None, None) => state.history.all(),
        (limit, offset) => state
            .history
            .page(limit.unwrap_or_else(default_limit), offset.unwrap_or(0)),
    };
    Json(ApiResponse::ok(messages))
}

// GET /api/chat-history/search
pub async fn search_history(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<ApiResponse<Vec<ChatMessage>>> {
    Json(ApiResponse::ok(state.history.search(&query.q)))
}

// GET /api/chat-history/summary
pub async fn history_summary(State(state): State<AppState>) -> Json<ApiResponse<ChatSummary>> {
    Json(ApiResponse::ok(state.history.summary()))
}

// DELETE /api/chat-history/{id}
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<()> {
    if state.history.delete_by_id(id) {
        Ok(Json(ApiResponse::message("Message deleted")))
    } else {
        Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Message '{}' not found", id),
        ))
    }
}

// POST /api/clear-history
pub async fn clear_history(State(state): State<AppState>) -> Json<ApiResponse<()>> {
    state.history.clear();
    Json(ApiResponse::message("Chat history cleared"))
}
