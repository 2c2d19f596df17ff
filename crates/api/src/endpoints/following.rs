//! Following endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use galeria_common::AppResult;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, MessageBody, message},
};

/// Follow request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    #[validate(length(min = 1))]
    pub followed_username: String,
}

/// Follow status response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatusResponse {
    pub is_following: bool,
}

/// Follow a user.
async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<MessageBody>> {
    req.validate()?;
    state
        .following_service
        .follow(&user, &req.followed_username)
        .await?;
    Ok(message("Followed"))
}

/// Unfollow a user.
async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<MessageBody>> {
    req.validate()?;
    state
        .following_service
        .unfollow(&user, &req.followed_username)
        .await?;
    Ok(message("Unfollowed"))
}

/// Whether one user follows another.
async fn status(
    State(state): State<AppState>,
    Path((follower, followed)): Path<(String, String)>,
) -> AppResult<ApiResponse<FollowStatusResponse>> {
    let is_following = state.following_service.status(&follower, &followed).await?;
    Ok(ApiResponse::ok(FollowStatusResponse { is_following }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow", post(follow))
        .route("/unfollow", post(unfollow))
        .route("/status/{follower}/{followed}", get(status))
}
