//! Unlock repository.
//!
//! Unlock sets only grow: rows are inserted with `ON CONFLICT DO NOTHING`
//! against the unique `(user_id, item_id)` index, so replaying an unlock is a
//! no-op.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{AlbumUnlock, PhotoUnlock, album_unlock, photo_unlock};
use galeria_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    sea_query::OnConflict,
};

/// Unlock repository for database operations.
#[derive(Clone)]
pub struct UnlockRepository {
    db: Arc<DatabaseConnection>,
}

impl UnlockRepository {
    /// Create a new unlock repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Add a user to a photo's unlock set. Returns whether the row is new.
    pub async fn unlock_photo(&self, id: String, user_id: &str, photo_id: &str) -> AppResult<bool> {
        let model = photo_unlock::ActiveModel {
            id: Set(id),
            user_id: Set(user_id.to_string()),
            photo_id: Set(photo_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let inserted = PhotoUnlock::insert(model)
            .on_conflict(
                OnConflict::columns([photo_unlock::Column::UserId, photo_unlock::Column::PhotoId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(inserted > 0)
    }

    /// Add a user to an album's unlock set. Returns whether the row is new.
    pub async fn unlock_album(&self, id: String, user_id: &str, album_id: &str) -> AppResult<bool> {
        let model = album_unlock::ActiveModel {
            id: Set(id),
            user_id: Set(user_id.to_string()),
            album_id: Set(album_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let inserted = AlbumUnlock::insert(model)
            .on_conflict(
                OnConflict::columns([album_unlock::Column::UserId, album_unlock::Column::AlbumId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(inserted > 0)
    }

    /// Check if a user has unlocked a photo.
    pub async fn is_photo_unlocked(&self, user_id: &str, photo_id: &str) -> AppResult<bool> {
        let row = PhotoUnlock::find()
            .filter(photo_unlock::Column::UserId.eq(user_id))
            .filter(photo_unlock::Column::PhotoId.eq(photo_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(row.is_some())
    }

    /// Check if a user has unlocked an album.
    pub async fn is_album_unlocked(&self, user_id: &str, album_id: &str) -> AppResult<bool> {
        let row = AlbumUnlock::find()
            .filter(album_unlock::Column::UserId.eq(user_id))
            .filter(album_unlock::Column::AlbumId.eq(album_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(row.is_some())
    }

    /// Which of the given photos the user has unlocked.
    pub async fn find_unlocked_photo_ids(
        &self,
        user_id: &str,
        photo_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        if photo_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<String> = PhotoUnlock::find()
            .select_only()
            .column(photo_unlock::Column::PhotoId)
            .filter(photo_unlock::Column::UserId.eq(user_id))
            .filter(photo_unlock::Column::PhotoId.is_in(photo_ids.to_vec()))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(ids.into_iter().collect())
    }

    /// Which of the given albums the user has unlocked.
    pub async fn find_unlocked_album_ids(
        &self,
        user_id: &str,
        album_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        if album_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<String> = AlbumUnlock::find()
            .select_only()
            .column(album_unlock::Column::AlbumId)
            .filter(album_unlock::Column::UserId.eq(user_id))
            .filter(album_unlock::Column::AlbumId.is_in(album_ids.to_vec()))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(ids.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_duplicate_unlock_is_noop() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = UnlockRepository::new(db);
        assert!(repo.unlock_photo("u1".into(), "buyer", "p1").await.unwrap());
        assert!(!repo.unlock_photo("u2".into(), "buyer", "p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_unlocked_empty_input_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let repo = UnlockRepository::new(db);

        assert!(repo.find_unlocked_photo_ids("buyer", &[]).await.unwrap().is_empty());
        assert!(repo.find_unlocked_album_ids("buyer", &[]).await.unwrap().is_empty());
    }
}
