//! Album endpoints.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{delete, get, post, put},
};
use galeria_common::AppResult;
use galeria_core::{AlbumView, CommentView, CreateAlbumInput, LikeSummary};

use crate::{
    endpoints::comments::CommentRequest,
    extractors::{AuthUser, MaybeAuthUser, UploadForm},
    middleware::AppState,
    response::{ApiResponse, MessageBody, message},
};

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<AlbumView>> {
    let form = UploadForm::read(multipart).await?;
    let input = CreateAlbumInput {
        title: form.text("title").unwrap_or_default(),
        description: form.text("description"),
        price: form.price()?,
        currency: form.text("currency"),
    };

    let album = state.album_service.create(&user, form.files, input).await?;
    Ok(ApiResponse::created(album))
}

async fn list_for_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<Vec<AlbumView>>> {
    let albums = state.album_service.list_for_user(&user, &username).await?;
    Ok(ApiResponse::ok(albums))
}

async fn show(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(album_id): Path<String>,
) -> AppResult<ApiResponse<AlbumView>> {
    let album = state.album_service.get(&album_id, user.as_ref()).await?;
    Ok(ApiResponse::ok(album))
}

async fn comments(
    State(state): State<AppState>,
    Path(album_id): Path<String>,
) -> AppResult<ApiResponse<Vec<CommentView>>> {
    let comments = state.comment_service.for_album(&album_id).await?;
    Ok(ApiResponse::ok(comments))
}

async fn add_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(album_id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> AppResult<ApiResponse<Vec<CommentView>>> {
    let comments = state
        .comment_service
        .add_to_album(&user, &album_id, &req.text)
        .await?;
    Ok(ApiResponse::created(comments))
}

async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(album_id): Path<String>,
) -> AppResult<ApiResponse<LikeSummary>> {
    let summary = state.like_service.toggle_album_like(&user, &album_id).await?;
    Ok(ApiResponse::ok(summary))
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(album_id): Path<String>,
) -> AppResult<ApiResponse<MessageBody>> {
    state.album_service.delete(&user, &album_id).await?;
    Ok(message("Album deleted"))
}

/// Simulated purchase, only with `payments.simulate_purchases`.
async fn unlock(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(album_id): Path<String>,
) -> AppResult<ApiResponse<MessageBody>> {
    state.album_service.unlock(&user, &album_id).await?;
    Ok(message("Album unlocked"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/user/{username}", get(list_for_user))
        .route("/delete/{album_id}", delete(remove))
        .route("/{album_id}", get(show))
        .route("/{album_id}/comments", get(comments).post(add_comment))
        .route("/{album_id}/like", put(like))
        .route("/{album_id}/unlock", put(unlock))
}
