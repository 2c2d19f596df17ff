//! Direct chat endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use galeria_common::AppResult;
use galeria_core::{ChatDetail, ChatMessageView, ChatSummary};
use serde::Deserialize;
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartChatRequest {
    #[validate(length(min = 1))]
    pub recipient_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,
}

async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ChatSummary>>> {
    let chats = state.chat_service.list(&user).await?;
    Ok(ApiResponse::ok(chats))
}

async fn start(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<StartChatRequest>,
) -> AppResult<ApiResponse<ChatSummary>> {
    req.validate()?;
    let (chat, _created) = state.chat_service.start(&user, &req.recipient_id).await?;
    Ok(ApiResponse::created(chat))
}

async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> AppResult<ApiResponse<ChatDetail>> {
    let chat = state.chat_service.get(&user, &chat_id).await?;
    Ok(ApiResponse::ok(chat))
}

async fn send_message(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<ApiResponse<ChatMessageView>> {
    let message = state
        .chat_service
        .send_message(&user, &chat_id, &req.content)
        .await?;
    Ok(ApiResponse::created(message))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/start", post(start))
        .route("/{chat_id}", get(show))
        .route("/{chat_id}/messages", post(send_message))
}
