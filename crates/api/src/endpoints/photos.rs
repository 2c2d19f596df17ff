//! Photo and video endpoints.

use axum::{
    Router,
    extract::{Multipart, Path, State},
    response::Redirect,
    routing::{delete, get, post, put},
};
use galeria_common::AppResult;
use galeria_core::{LikeSummary, PhotoView, UploadMeta};
use serde::Serialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser, UploadForm},
    middleware::AppState,
    response::{ApiResponse, MessageBody, message},
};

#[derive(Debug, Serialize)]
pub struct MediaUrlResponse {
    pub url: String,
}

async fn upload(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((username, category)): Path<(String, String)>,
    multipart: Multipart,
) -> AppResult<ApiResponse<Vec<PhotoView>>> {
    let form = UploadForm::read(multipart).await?;
    let meta = UploadMeta {
        title: form.text("title"),
        description: form.text("description"),
        price: form.price()?,
        currency: form.text("currency"),
    };

    let photos = state
        .photo_service
        .upload(&user, &username, &category, form.files, meta)
        .await?;
    Ok(ApiResponse::created(photos))
}

async fn gallery(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<Vec<PhotoView>>> {
    let photos = state.photo_service.gallery(&user, &username).await?;
    Ok(ApiResponse::ok(photos))
}

async fn posts(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<Vec<PhotoView>>> {
    let photos = state.photo_service.posts(&user, &username).await?;
    Ok(ApiResponse::ok(photos))
}

async fn show(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> AppResult<ApiResponse<PhotoView>> {
    let photo = state.photo_service.get(&photo_id, user.as_ref()).await?;
    Ok(ApiResponse::ok(photo))
}

async fn thumbnail(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> AppResult<Redirect> {
    let url = state.photo_service.thumbnail_url(&photo_id).await?;
    Ok(Redirect::temporary(&url))
}

async fn media_url(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> AppResult<ApiResponse<MediaUrlResponse>> {
    let url = state
        .photo_service
        .media_url(&photo_id, user.as_ref())
        .await?;
    Ok(ApiResponse::ok(MediaUrlResponse { url }))
}

async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> AppResult<ApiResponse<LikeSummary>> {
    let summary = state.like_service.toggle_photo_like(&user, &photo_id).await?;
    Ok(ApiResponse::ok(summary))
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> AppResult<ApiResponse<MessageBody>> {
    state.photo_service.delete(&user, &photo_id).await?;
    Ok(message("Photo deleted"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload/{username}/{category}", post(upload))
        .route("/user/{username}/gallery", get(gallery))
        .route("/user/{username}/posts", get(posts))
        .route("/thumbnail/{photo_id}", get(thumbnail))
        .route("/delete/{photo_id}", delete(remove))
        .route("/{photo_id}", get(show))
        .route("/{photo_id}/url", get(media_url))
        .route("/{photo_id}/like", put(like))
}
