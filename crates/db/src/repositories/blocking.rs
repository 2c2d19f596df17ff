//! Blocking repository.

use std::sync::Arc;

use crate::entities::{Blocking, blocking};
use galeria_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

/// Blocking repository for database operations.
#[derive(Clone)]
pub struct BlockingRepository {
    db: Arc<DatabaseConnection>,
}

impl BlockingRepository {
    /// Create a new blocking repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a blocking relationship by blocker and blockee.
    pub async fn find_by_pair(
        &self,
        blocker_id: &str,
        blockee_id: &str,
    ) -> AppResult<Option<blocking::Model>> {
        Blocking::find()
            .filter(blocking::Column::BlockerId.eq(blocker_id))
            .filter(blocking::Column::BlockeeId.eq(blockee_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if `blocker_id` blocks `blockee_id`.
    pub async fn is_blocking(&self, blocker_id: &str, blockee_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(blocker_id, blockee_id).await?.is_some())
    }

    /// Check if either user blocks the other.
    pub async fn is_blocked_either_way(&self, a: &str, b: &str) -> AppResult<bool> {
        let count = Blocking::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(blocking::Column::BlockerId.eq(a))
                            .add(blocking::Column::BlockeeId.eq(b)),
                    )
                    .add(
                        Condition::all()
                            .add(blocking::Column::BlockerId.eq(b))
                            .add(blocking::Column::BlockeeId.eq(a)),
                    ),
            )
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Create a new blocking relationship.
    pub async fn create(&self, model: blocking::ActiveModel) -> AppResult<blocking::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a blocking relationship by pair. Returns whether a row was removed.
    pub async fn delete_by_pair(&self, blocker_id: &str, blockee_id: &str) -> AppResult<bool> {
        let result = Blocking::delete_many()
            .filter(blocking::Column::BlockerId.eq(blocker_id))
            .filter(blocking::Column::BlockeeId.eq(blockee_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Users blocked by `user_id`, newest first.
    pub async fn find_blocking(&self, user_id: &str) -> AppResult<Vec<blocking::Model>> {
        Blocking::find()
            .filter(blocking::Column::BlockerId.eq(user_id))
            .order_by_desc(blocking::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
