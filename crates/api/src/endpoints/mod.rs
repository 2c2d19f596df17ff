//! API endpoints.

mod albums;
mod auth;
mod blocking;
mod chats;
mod comments;
mod feed;
mod following;
mod mercadopago;
mod notifications;
mod payment;
mod photos;
mod profile;
mod reports;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/photos", photos::router())
        .nest("/profile", profile::router())
        .nest("/feed", feed::router())
        .nest("/follow", following::router())
        .nest("/noti", notifications::router())
        .nest("/comment", comments::router())
        .nest("/albums", albums::router())
        .nest("/payment", payment::router())
        .nest("/mp", mercadopago::router())
        .nest("/report", reports::report_router())
        .nest("/support", reports::support_router())
        .nest("/chats", chats::router())
        .nest("/users", users::router())
        .nest("/block", blocking::router())
}
