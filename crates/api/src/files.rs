//! Serving stored media for the local storage backend.
//!
//! Public objects are served as-is. Private objects need the `expires` and
//! `signature` pair produced by [`StorageBackend::signed_url`].
//!
//! [`StorageBackend::signed_url`]: galeria_common::StorageBackend::signed_url

use axum::{
    Router,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use galeria_common::{AppError, AppResult, Bucket};
use serde::Deserialize;

use crate::middleware::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SignatureQuery {
    pub expires: Option<i64>,
    pub signature: Option<String>,
}

/// Content type from the key's extension.
fn content_type_for(key: &str) -> &'static str {
    let extension = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

async fn serve(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
    Query(query): Query<SignatureQuery>,
) -> AppResult<impl IntoResponse> {
    let bucket = Bucket::parse(&bucket).ok_or_else(|| AppError::NotFound(format!("File {key}")))?;

    if bucket == Bucket::Private {
        let (Some(expires), Some(signature)) = (query.expires, query.signature.as_deref()) else {
            return Err(AppError::Forbidden("Signature required".to_string()));
        };
        if !state.storage.verify_signed_url(&key, expires, signature) {
            return Err(AppError::Forbidden("Invalid or expired signature".to_string()));
        }
    }

    let data = state.storage.read(bucket, &key).await?;
    Ok(([(header::CONTENT_TYPE, content_type_for(&key))], data))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{bucket}/{*key}", get(serve))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("u1/abc.JPG"), "image/jpeg");
        assert_eq!(content_type_for("u1/clip.mp4"), "video/mp4");
        assert_eq!(content_type_for("profiles/alice"), "application/octet-stream");
    }
}
