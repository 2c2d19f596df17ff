//! Home feed endpoint.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use galeria_common::AppResult;
use galeria_core::PhotoView;
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    /// Return items older than this photo id.
    pub until_id: Option<String>,
}

async fn home(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<ApiResponse<Vec<PhotoView>>> {
    let photos = state
        .feed_service
        .home(&user, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(photos))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home))
}
