//! Account-wide user endpoints.

use axum::{
    Router,
    extract::State,
    routing::{delete, get},
};
use axum_extra::extract::cookie::CookieJar;
use galeria_common::AppResult;
use galeria_core::UserSummary;

use crate::{
    endpoints::auth::clear_session,
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, MessageBody, message},
};

async fn delete_account(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, ApiResponse<MessageBody>)> {
    state.account_service.delete_account(&user).await?;
    Ok((clear_session(jar), message("Account deleted")))
}

async fn public_users(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<UserSummary>>> {
    let users = state.account_service.public_users().await?;
    Ok(ApiResponse::ok(users))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/delete-account", delete(delete_account))
        .route("/public", get(public_users))
}
