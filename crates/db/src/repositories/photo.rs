//! Photo repository.

use std::sync::Arc;

use crate::entities::{Photo, photo, photo::PhotoCategory};
use galeria_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};

/// Photo repository for database operations.
#[derive(Clone)]
pub struct PhotoRepository {
    db: Arc<DatabaseConnection>,
}

impl PhotoRepository {
    /// Create a new photo repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a photo by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<photo::Model>> {
        Photo::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a photo by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<photo::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PhotoNotFound(id.to_string()))
    }

    /// Create a new photo.
    pub async fn create(&self, model: photo::ActiveModel) -> AppResult<photo::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a photo.
    pub async fn delete(&self, photo: photo::Model) -> AppResult<()> {
        photo
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Photos of one profile section, newest first.
    pub async fn find_by_user_and_category(
        &self,
        user_id: &str,
        category: PhotoCategory,
    ) -> AppResult<Vec<photo::Model>> {
        Photo::find()
            .filter(photo::Column::UserId.eq(user_id))
            .filter(photo::Column::Category.eq(category))
            .order_by_desc(photo::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every photo a user owns, album photos included.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<photo::Model>> {
        Photo::find()
            .filter(photo::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Photos of an album in upload order.
    pub async fn find_by_album(&self, album_id: &str) -> AppResult<Vec<photo::Model>> {
        Photo::find()
            .filter(photo::Column::AlbumId.eq(album_id))
            .order_by_asc(photo::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Photos of several albums in upload order.
    pub async fn find_by_albums(&self, album_ids: &[String]) -> AppResult<Vec<photo::Model>> {
        if album_ids.is_empty() {
            return Ok(vec![]);
        }

        Photo::find()
            .filter(photo::Column::AlbumId.is_in(album_ids.to_vec()))
            .order_by_asc(photo::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Feed photos posted by the given users, album photos excluded (paginated).
    pub async fn find_feed(
        &self,
        user_ids: &[String],
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<photo::Model>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut query = Photo::find()
            .filter(photo::Column::UserId.is_in(user_ids.to_vec()))
            .filter(photo::Column::Category.ne(PhotoCategory::Albums))
            .order_by_desc(photo::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(photo::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment likes count atomically.
    pub async fn increment_likes_count(&self, photo_id: &str) -> AppResult<()> {
        Photo::update_many()
            .col_expr(
                photo::Column::LikesCount,
                Expr::col(photo::Column::LikesCount).add(1),
            )
            .filter(photo::Column::Id.eq(photo_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement likes count atomically, never below zero.
    pub async fn decrement_likes_count(&self, photo_id: &str) -> AppResult<()> {
        Photo::update_many()
            .col_expr(
                photo::Column::LikesCount,
                Expr::cust("GREATEST(likes_count - 1, 0)"),
            )
            .filter(photo::Column::Id.eq(photo_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::entities::photo::MediaType;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    pub fn create_test_photo(id: &str, user_id: &str, price: f64) -> photo::Model {
        let paid = price > 0.0;
        photo::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            username: format!("{user_id}_name"),
            title: Some("Sunset".to_string()),
            description: None,
            file_name: format!("2025/01/01/{user_id}/{id}.jpg"),
            public_url: (!paid).then(|| format!("/files/public/{id}.jpg")),
            blur_url: paid.then(|| format!("/files/public/{id}_blur.jpg")),
            thumbnail_url: None,
            blurhash: None,
            responsive: serde_json::json!([]),
            is_paid_content: paid,
            category: PhotoCategory::Posts,
            album_id: None,
            likes_count: 0,
            price,
            currency: "ARS".to_string(),
            media_type: MediaType::Image,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<photo::Model>::new()])
                .into_connection(),
        );

        let repo = PhotoRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::PhotoNotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_find_by_user_and_category() {
        let photo1 = create_test_photo("p2", "user1", 0.0);
        let photo2 = create_test_photo("p1", "user1", 150.0);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[photo1, photo2]])
                .into_connection(),
        );

        let repo = PhotoRepository::new(db);
        let result = repo
            .find_by_user_and_category("user1", PhotoCategory::Posts)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "p2");
        assert!(result[1].is_paid_content);
    }

    #[tokio::test]
    async fn test_find_feed_without_sources_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let repo = PhotoRepository::new(db);

        assert!(repo.find_feed(&[], 20, None).await.unwrap().is_empty());
    }
}
