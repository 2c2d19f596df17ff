//! Profile endpoints.

use axum::{
    Router,
    extract::{Multipart, Path, State},
    routing::{get, put},
};
use galeria_common::AppResult;
use galeria_core::{ProfileView, UpdateProfileInput, UserSummary};

use crate::{
    extractors::{AuthUser, MaybeAuthUser, UploadForm},
    middleware::AppState,
    response::ApiResponse,
};

async fn show(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<ProfileView>> {
    let profile = state
        .account_service
        .profile(&username, user.as_ref())
        .await?;
    Ok(ApiResponse::ok(profile))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<ProfileView>> {
    let mut form = UploadForm::read(multipart).await?;
    // Blank fields keep the current value
    let input = UpdateProfileInput {
        name: form.text("nombre"),
        description: form.text("description"),
        instagram: form.text("instagram"),
    };
    let photo = form.take_file();

    let profile = state
        .account_service
        .update_profile(&user, &username, input, photo)
        .await?;
    Ok(ApiResponse::ok(profile))
}

async fn followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<Vec<UserSummary>>> {
    let users = state.following_service.followers(&username).await?;
    Ok(ApiResponse::ok(users))
}

async fn following(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<Vec<UserSummary>>> {
    let users = state.following_service.following(&username).await?;
    Ok(ApiResponse::ok(users))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload/{username}/update-profile", put(update))
        .route("/{username}", get(show))
        .route("/{username}/followers", get(followers))
        .route("/{username}/following", get(following))
}
