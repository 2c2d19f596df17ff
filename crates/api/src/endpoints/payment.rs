//! Checkout endpoints.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
};
use galeria_common::AppResult;
use galeria_core::CreateOrderInput;
use serde::Deserialize;
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Checkout request. Any client-sent `amount` is ignored; the stored price is charged.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub photo_id: Option<String>,
    pub album_id: Option<String>,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReturnQuery {
    pub seller: Option<String>,
}

async fn create_order(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    req.validate()?;

    let preference = state
        .payment_service
        .create_order(
            &user,
            CreateOrderInput {
                photo_id: req.photo_id.filter(|id| !id.is_empty()),
                album_id: req.album_id.filter(|id| !id.is_empty()),
                title: req.title,
            },
        )
        .await?;
    Ok(ApiResponse::ok(preference))
}

/// Gateway notification. The gateway sends either `topic`/`id` or
/// `type`/`data.id` in the query string.
async fn webhook(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<StatusCode> {
    let topic = params.get("topic").or_else(|| params.get("type"));
    let id = params.get("id").or_else(|| params.get("data.id"));

    state
        .payment_service
        .handle_webhook(topic.map(String::as_str), id.map(String::as_str))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn success(State(state): State<AppState>, Query(query): Query<ReturnQuery>) -> Redirect {
    let seller = query.seller.unwrap_or_default();
    Redirect::to(&format!(
        "{}/{}",
        state.frontend_url.trim_end_matches('/'),
        urlencoding::encode(&seller)
    ))
}

async fn failure() -> &'static str {
    "Pago fallido"
}

async fn pending() -> &'static str {
    "Pago pendiente"
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-order", post(create_order))
        .route("/webhook", post(webhook))
        .route("/success", get(success))
        .route("/failure", get(failure))
        .route("/pending", get(pending))
}
