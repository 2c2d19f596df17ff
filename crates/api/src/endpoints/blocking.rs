//! Blocking endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use galeria_common::AppResult;
use galeria_core::UserSummary;
use serde::Deserialize;
use validator::Validate;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, MessageBody, message},
};

/// Block request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BlockRequest {
    #[validate(length(min = 1))]
    pub user_id: String,
}

/// Block a user.
async fn block(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BlockRequest>,
) -> AppResult<ApiResponse<MessageBody>> {
    req.validate()?;
    state.blocking_service.block(&user, &req.user_id).await?;
    Ok(message("User blocked"))
}

/// Unblock a user.
async fn unblock(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BlockRequest>,
) -> AppResult<ApiResponse<MessageBody>> {
    req.validate()?;
    state.blocking_service.unblock(&user, &req.user_id).await?;
    Ok(message("User unblocked"))
}

/// Users blocked by the caller.
async fn blocked(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<UserSummary>>> {
    let users = state.blocking_service.blocked(&user).await?;
    Ok(ApiResponse::ok(users))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/block", post(block))
        .route("/unblock", post(unblock))
        .route("/blocked", get(blocked))
}
