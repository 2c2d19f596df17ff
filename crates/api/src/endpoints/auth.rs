//! Authentication endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use galeria_common::{AppResult, SESSION_COOKIE};
use galeria_core::{RegisterInput, ResetPasswordInput};
use galeria_db::entities::user;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, MessageBody, message},
};

/// Signed-in user as returned by the auth endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUserResponse {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    pub username: String,
    pub email: String,
    pub photo: Option<String>,
    pub instagram: Option<String>,
    pub description: Option<String>,
}

impl From<user::Model> for SessionUserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            username: u.username,
            email: u.email,
            photo: u.photo,
            instagram: u.instagram,
            description: u.description,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(rename = "nombre")]
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    pub confirm_password: String,
    pub instagram: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub identifier: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 6, max = 128))]
    pub new_password: String,
    pub confirm_password: String,
}

/// Build the session cookie for a token.
pub(crate) fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    build_session_cookie(token, state.cookie_secure, state.tokens.ttl().num_seconds())
}

fn build_session_cookie(token: String, secure: bool, max_age_secs: i64) -> Cookie<'static> {
    let same_site = if secure { SameSite::None } else { SameSite::Lax };
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(same_site)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Remove the session cookie.
pub(crate) fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

fn sign_in(state: &AppState, jar: CookieJar, user: &user::Model) -> AppResult<CookieJar> {
    let token = state.tokens.issue(&user.id, &user.username)?;
    Ok(jar.add(session_cookie(state, token)))
}

async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(CookieJar, ApiResponse<SessionUserResponse>)> {
    req.validate()?;

    let user = state
        .auth_service
        .register(RegisterInput {
            name: req.name,
            username: req.username,
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
            instagram: req.instagram,
        })
        .await?;

    let jar = sign_in(&state, jar, &user)?;
    Ok((jar, ApiResponse::created(user.into())))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> AppResult<(CookieJar, ApiResponse<SessionUserResponse>)> {
    req.validate()?;

    let user = state
        .auth_service
        .login(req.identifier.trim(), &req.password)
        .await?;

    tracing::info!(user_id = %user.id, "Signed in");
    let jar = sign_in(&state, jar, &user)?;
    Ok((jar, ApiResponse::ok(user.into())))
}

async fn verify(AuthUser(user): AuthUser) -> ApiResponse<SessionUserResponse> {
    ApiResponse::ok(user.into())
}

async fn logout(jar: CookieJar) -> (CookieJar, ApiResponse<MessageBody>) {
    (clear_session(jar), message("Logged out"))
}

async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AppResult<ApiResponse<MessageBody>> {
    req.validate()?;
    state.auth_service.forgot_password(req.email.trim()).await?;
    Ok(message("Password reset email sent"))
}

async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> AppResult<ApiResponse<MessageBody>> {
    req.validate()?;
    state
        .auth_service
        .reset_password(ResetPasswordInput {
            token: req.token,
            new_password: req.new_password,
            confirm_password: req.confirm_password,
        })
        .await?;
    Ok(message("Password updated"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify", get(verify))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_field_names() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"nombre":"Ana","username":"ana","email":"ana@example.com","password":"secret1","confirmPassword":"secret1"}"#,
        )
        .unwrap();
        assert_eq!(req.name, "Ana");
        assert_eq!(req.confirm_password, "secret1");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_request_rejects_short_username() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"nombre":"Ana","username":"an","email":"ana@example.com","password":"secret1","confirmPassword":"secret1"}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_login_request_rejects_short_password() {
        let req = LoginRequest {
            identifier: "ana".to_string(),
            password: "123".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = build_session_cookie("abc".to_string(), true, 86_400);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(1)));

        let local = build_session_cookie("abc".to_string(), false, 86_400);
        assert_eq!(local.same_site(), Some(SameSite::Lax));
    }
}
