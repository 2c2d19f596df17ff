//! Like repository (photo and album likes).

use std::sync::Arc;

use crate::entities::{AlbumLike, PhotoLike, album_like, photo_like};
use galeria_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if a user likes a photo.
    pub async fn has_liked_photo(&self, user_id: &str, photo_id: &str) -> AppResult<bool> {
        let like = PhotoLike::find()
            .filter(photo_like::Column::UserId.eq(user_id))
            .filter(photo_like::Column::PhotoId.eq(photo_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(like.is_some())
    }

    /// Record a photo like.
    pub async fn create_photo_like(
        &self,
        model: photo_like::ActiveModel,
    ) -> AppResult<photo_like::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a photo like. Returns whether a row was removed.
    pub async fn delete_photo_like(&self, user_id: &str, photo_id: &str) -> AppResult<bool> {
        let result = PhotoLike::delete_many()
            .filter(photo_like::Column::UserId.eq(user_id))
            .filter(photo_like::Column::PhotoId.eq(photo_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Check if a user likes an album.
    pub async fn has_liked_album(&self, user_id: &str, album_id: &str) -> AppResult<bool> {
        let like = AlbumLike::find()
            .filter(album_like::Column::UserId.eq(user_id))
            .filter(album_like::Column::AlbumId.eq(album_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(like.is_some())
    }

    /// Record an album like.
    pub async fn create_album_like(
        &self,
        model: album_like::ActiveModel,
    ) -> AppResult<album_like::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove an album like. Returns whether a row was removed.
    pub async fn delete_album_like(&self, user_id: &str, album_id: &str) -> AppResult<bool> {
        let result = AlbumLike::delete_many()
            .filter(album_like::Column::UserId.eq(user_id))
            .filter(album_like::Column::AlbumId.eq(album_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}
