//! Notification endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, put},
};
use galeria_common::{AppError, AppResult};
use galeria_core::NotificationView;
use galeria_db::entities::user;
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub updated: u64,
}

fn ensure_own(user: &user::Model, username: &str) -> AppResult<()> {
    if user.username.eq_ignore_ascii_case(username) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Cannot access another user's notifications".to_string(),
        ))
    }
}

async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<Vec<NotificationView>>> {
    ensure_own(&user, &username)?;
    let notifications = state.notification_service.list(&user.id).await?;
    Ok(ApiResponse::ok(notifications))
}

async fn mark_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<MarkReadResponse>> {
    ensure_own(&user, &username)?;
    let updated = state.notification_service.mark_all_as_read(&user.id).await?;
    Ok(ApiResponse::ok(MarkReadResponse { updated }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications/{username}", get(list))
        .route("/notifications/read/{username}", put(mark_read))
}
