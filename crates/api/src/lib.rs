//! HTTP API layer for galeria.
//!
//! This crate provides the REST API and real-time streaming:
//!
//! - **Endpoints**: auth, media, albums, social graph, payments, chat
//! - **Extractors**: session user, multipart upload forms
//! - **Middleware**: cookie session authentication
//! - **Streaming**: WebSocket hub with per-user and per-chat rooms
//! - **Files**: local storage serving with signed private URLs
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod files;
pub mod middleware;
pub mod response;
pub mod streaming;

pub use endpoints::router;
pub use files::router as files_router;
pub use streaming::{StreamingHub, streaming_handler};
