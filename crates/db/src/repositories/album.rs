//! Album repository.

use std::sync::Arc;

use crate::entities::{Album, album};
use galeria_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, sea_query::Expr,
};

/// Album repository for database operations.
#[derive(Clone)]
pub struct AlbumRepository {
    db: Arc<DatabaseConnection>,
}

impl AlbumRepository {
    /// Create a new album repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an album by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<album::Model>> {
        Album::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an album by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<album::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Album {id}")))
    }

    /// Create a new album.
    pub async fn create(&self, model: album::ActiveModel) -> AppResult<album::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an album. Its photos are removed by the foreign key cascade.
    pub async fn delete(&self, album: album::Model) -> AppResult<()> {
        album
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Albums of a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<album::Model>> {
        Album::find()
            .filter(album::Column::UserId.eq(user_id))
            .order_by_desc(album::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment likes count atomically.
    pub async fn increment_likes_count(&self, album_id: &str) -> AppResult<()> {
        Album::update_many()
            .col_expr(
                album::Column::LikesCount,
                Expr::col(album::Column::LikesCount).add(1),
            )
            .filter(album::Column::Id.eq(album_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement likes count atomically, never below zero.
    pub async fn decrement_likes_count(&self, album_id: &str) -> AppResult<()> {
        Album::update_many()
            .col_expr(
                album::Column::LikesCount,
                Expr::cust("GREATEST(likes_count - 1, 0)"),
            )
            .filter(album::Column::Id.eq(album_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
