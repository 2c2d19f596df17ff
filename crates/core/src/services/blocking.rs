//! Blocking service.

use chrono::Utc;
use galeria_common::{AppError, AppResult, IdGenerator};
use galeria_db::{
    entities::{blocking, user},
    repositories::{BlockingRepository, FollowingRepository, UserRepository},
};
use sea_orm::Set;

use crate::services::following::UserSummary;

/// Blocking service for business logic.
#[derive(Clone)]
pub struct BlockingService {
    blocking_repo: BlockingRepository,
    following_repo: FollowingRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl BlockingService {
    /// Create a new blocking service.
    #[must_use]
    pub const fn new(
        blocking_repo: BlockingRepository,
        following_repo: FollowingRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            blocking_repo,
            following_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Block a user. Follows in both directions are removed.
    pub async fn block(&self, blocker: &user::Model, blockee_id: &str) -> AppResult<()> {
        if blocker.id == blockee_id {
            return Err(AppError::BadRequest("Cannot block yourself".to_string()));
        }

        let blockee = self.user_repo.get_by_id(blockee_id).await?;

        if self.blocking_repo.is_blocking(&blocker.id, &blockee.id).await? {
            return Err(AppError::BadRequest("User is already blocked".to_string()));
        }

        self.blocking_repo
            .create(blocking::ActiveModel {
                id: Set(self.id_gen.generate()),
                blocker_id: Set(blocker.id.clone()),
                blockee_id: Set(blockee.id.clone()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        if self
            .following_repo
            .delete_by_pair(&blocker.id, &blockee.id)
            .await?
        {
            self.user_repo.decrement_following_count(&blocker.id).await?;
            self.user_repo.decrement_followers_count(&blockee.id).await?;
        }

        if self
            .following_repo
            .delete_by_pair(&blockee.id, &blocker.id)
            .await?
        {
            self.user_repo.decrement_following_count(&blockee.id).await?;
            self.user_repo.decrement_followers_count(&blocker.id).await?;
        }

        tracing::info!(blocker = %blocker.id, blockee = %blockee.id, "User blocked");
        Ok(())
    }

    /// Lift a block.
    pub async fn unblock(&self, blocker: &user::Model, blockee_id: &str) -> AppResult<()> {
        if !self
            .blocking_repo
            .delete_by_pair(&blocker.id, blockee_id)
            .await?
        {
            return Err(AppError::BadRequest("User is not blocked".to_string()));
        }

        tracing::info!(blocker = %blocker.id, blockee = %blockee_id, "User unblocked");
        Ok(())
    }

    /// Users blocked by the given user.
    pub async fn blocked(&self, blocker: &user::Model) -> AppResult<Vec<UserSummary>> {
        let ids: Vec<String> = self
            .blocking_repo
            .find_blocking(&blocker.id)
            .await?
            .into_iter()
            .map(|b| b.blockee_id)
            .collect();

        Ok(self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(UserSummary::from)
            .collect())
    }
}
