//! Photo comment endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use galeria_common::AppResult;
use galeria_core::CommentView;
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

async fn list(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> AppResult<ApiResponse<Vec<CommentView>>> {
    let comments = state.comment_service.for_photo(&photo_id).await?;
    Ok(ApiResponse::ok(comments))
}

async fn add(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> AppResult<ApiResponse<Vec<CommentView>>> {
    let comments = state
        .comment_service
        .add_to_photo(&user, &photo_id, &req.text)
        .await?;
    Ok(ApiResponse::created(comments))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{photo_id}/comments", get(list).post(add))
}
