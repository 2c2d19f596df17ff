//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use galeria_common::{SESSION_COOKIE, StorageBackend, TokenService};
use galeria_core::{
    AccountService, AlbumService, AuthService, BlockingService, ChatService, CommentService,
    FeedService, FollowingService, LikeService, NotificationService, PaymentService, PhotoService,
    ReportService, SellerService,
};

use crate::streaming::StreamingHub;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub account_service: AccountService,
    pub photo_service: PhotoService,
    pub album_service: AlbumService,
    pub like_service: LikeService,
    pub comment_service: CommentService,
    pub feed_service: FeedService,
    pub following_service: FollowingService,
    pub blocking_service: BlockingService,
    pub notification_service: NotificationService,
    pub payment_service: PaymentService,
    pub seller_service: SellerService,
    pub report_service: ReportService,
    pub chat_service: ChatService,
    pub tokens: TokenService,
    pub storage: Arc<dyn StorageBackend>,
    pub frontend_url: String,
    pub cookie_secure: bool,
    pub streaming: StreamingHub,
}

/// Authentication middleware.
///
/// Resolves the session cookie into a user and stores it in the request
/// extensions. Requests without a valid session pass through anonymously.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let claims = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.tokens.verify(cookie.value()).ok());
    if let Some(claims) = claims {
        match state.auth_service.session_user(&claims.sub).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
            }
            Ok(None) => {
                tracing::debug!(user_id = %claims.sub, "Session for a deleted account");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to resolve session user");
            }
        }
    }

    next.run(req).await
}
