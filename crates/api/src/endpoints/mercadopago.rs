//! Seller account linking with Mercado Pago.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
};
use galeria_common::AppResult;
use galeria_core::SellerPreferenceInput;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PreferenceRequest {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(range(min = 0.0))]
    pub unit_price: f64,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1))]
    pub quantity: u32,
    pub marketplace_fee: Option<f64>,
}

const fn default_quantity() -> u32 {
    1
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerStatusResponse {
    pub is_linked: bool,
}

#[derive(Serialize)]
pub struct CurrencyResponse {
    pub currency: &'static str,
}

async fn connect(State(state): State<AppState>, Path(seller_id): Path<String>) -> Redirect {
    Redirect::to(&state.seller_service.connect_url(&seller_id))
}

async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> AppResult<Redirect> {
    let target = state
        .seller_service
        .handle_callback(query.code.as_deref(), query.state.as_deref())
        .await?;
    Ok(Redirect::to(&target))
}

async fn create_preference(
    State(state): State<AppState>,
    Path(seller_id): Path<String>,
    Json(req): Json<PreferenceRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    req.validate()?;
    let preference = state
        .seller_service
        .create_preference(
            &seller_id,
            SellerPreferenceInput {
                title: req.title,
                unit_price: req.unit_price,
                quantity: req.quantity,
                marketplace_fee: req.marketplace_fee,
            },
        )
        .await?;
    Ok(ApiResponse::ok(preference))
}

async fn check_seller(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SellerStatusResponse>> {
    let is_linked = state.seller_service.is_linked(&user).await?;
    Ok(ApiResponse::ok(SellerStatusResponse { is_linked }))
}

async fn get_currency(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CurrencyResponse>> {
    let currency = state.seller_service.currency(&user).await?;
    Ok(ApiResponse::ok(CurrencyResponse { currency }))
}

async fn success() -> &'static str {
    "Pago completado (success)"
}

async fn failure() -> &'static str {
    "Pago fallido (failure)"
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/connect/{seller_id}", get(connect))
        .route("/callback", get(callback))
        .route("/create_preference/{seller_id}", post(create_preference))
        .route("/check_seller", get(check_seller))
        .route("/get_currency", get(get_currency))
        .route("/success", get(success))
        .route("/failure", get(failure))
}
