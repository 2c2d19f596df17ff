//! Content reports and support requests.

use axum::{Json, Router, extract::State, routing::post};
use galeria_common::AppResult;
use galeria_core::{CreateReportInput, SupportRequestInput};
use galeria_db::entities::report::ReportItemType;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[validate(length(min = 1))]
    pub item_id: String,
    pub item_type: ReportItemType,
    #[validate(length(min = 1, max = 200))]
    pub reason: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportProfileRequest {
    #[validate(length(min = 1))]
    pub reported_user_id: String,
    #[validate(length(min = 1, max = 200))]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct SupportRequest {
    pub subject: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: String,
    pub message: &'static str,
}

async fn report(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> AppResult<ApiResponse<CreatedResponse>> {
    req.validate()?;
    let created = state
        .report_service
        .report(
            &user,
            CreateReportInput {
                item_id: req.item_id,
                item_type: req.item_type,
                reason: req.reason,
                description: req.description,
            },
        )
        .await?;
    Ok(ApiResponse::created(CreatedResponse {
        id: created.id,
        message: "Report submitted",
    }))
}

async fn report_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReportProfileRequest>,
) -> AppResult<ApiResponse<CreatedResponse>> {
    req.validate()?;
    let created = state
        .report_service
        .report_profile(&user, &req.reported_user_id, &req.reason)
        .await?;
    Ok(ApiResponse::created(CreatedResponse {
        id: created.id,
        message: "Report submitted",
    }))
}

async fn help(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SupportRequest>,
) -> AppResult<ApiResponse<CreatedResponse>> {
    // Length limits are enforced by the service
    let created = state
        .report_service
        .request_support(
            &user,
            SupportRequestInput {
                subject: req.subject,
                message: req.message,
            },
        )
        .await?;
    Ok(ApiResponse::created(CreatedResponse {
        id: created.id,
        message: "Support request sent",
    }))
}

pub fn report_router() -> Router<AppState> {
    Router::new()
        .route("/", post(report))
        .route("/reportprofile", post(report_profile))
}

pub fn support_router() -> Router<AppState> {
    Router::new().route("/help", post(help))
}
