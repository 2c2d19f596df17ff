//! Following service.

use chrono::Utc;
use galeria_common::{AppError, AppResult, IdGenerator};
use galeria_db::{
    entities::{following, notification::NotificationType, user},
    repositories::{BlockingRepository, FollowingRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;

use crate::services::notification::{NotificationService, NotificationTarget};

/// Minimal public identity of a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub photo: Option<String>,
}

impl From<user::Model> for UserSummary {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            photo: user.photo,
        }
    }
}

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    following_repo: FollowingRepository,
    blocking_repo: BlockingRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(
        following_repo: FollowingRepository,
        blocking_repo: BlockingRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            following_repo,
            blocking_repo,
            user_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a user by username.
    pub async fn follow(&self, follower: &user::Model, followed_username: &str) -> AppResult<()> {
        if follower.username.eq_ignore_ascii_case(followed_username) {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        let followee = self.user_repo.get_by_username(followed_username).await?;

        if self
            .following_repo
            .is_following(&follower.id, &followee.id)
            .await?
        {
            return Err(AppError::BadRequest("Already following".to_string()));
        }

        if self
            .blocking_repo
            .is_blocked_either_way(&follower.id, &followee.id)
            .await?
        {
            return Err(AppError::Forbidden("Cannot follow this user".to_string()));
        }

        self.following_repo
            .create(following::ActiveModel {
                id: Set(self.id_gen.generate()),
                follower_id: Set(follower.id.clone()),
                followee_id: Set(followee.id.clone()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        self.user_repo.increment_following_count(&follower.id).await?;
        self.user_repo.increment_followers_count(&followee.id).await?;

        if let Err(e) = self
            .notifications
            .notify(
                &followee,
                follower,
                NotificationType::Follow,
                NotificationTarget::default(),
            )
            .await
        {
            tracing::warn!(error = %e, followee = %followee.id, "Failed to create follow notification");
        }

        tracing::info!(follower = %follower.id, followee = %followee.id, "User followed");
        Ok(())
    }

    /// Stop following a user by username.
    pub async fn unfollow(&self, follower: &user::Model, followed_username: &str) -> AppResult<()> {
        let followee = self.user_repo.get_by_username(followed_username).await?;

        if !self
            .following_repo
            .delete_by_pair(&follower.id, &followee.id)
            .await?
        {
            return Err(AppError::BadRequest("Not following this user".to_string()));
        }

        self.user_repo.decrement_following_count(&follower.id).await?;
        self.user_repo.decrement_followers_count(&followee.id).await?;

        tracing::info!(follower = %follower.id, followee = %followee.id, "User unfollowed");
        Ok(())
    }

    /// Whether one user follows another.
    pub async fn status(&self, follower_username: &str, followed_username: &str) -> AppResult<bool> {
        let follower = self.user_repo.get_by_username(follower_username).await?;
        let followee = self.user_repo.get_by_username(followed_username).await?;
        self.following_repo
            .is_following(&follower.id, &followee.id)
            .await
    }

    /// Users following the given user.
    pub async fn followers(&self, username: &str) -> AppResult<Vec<UserSummary>> {
        let user = self.user_repo.get_by_username(username).await?;
        let ids: Vec<String> = self
            .following_repo
            .find_followers(&user.id)
            .await?
            .into_iter()
            .map(|f| f.follower_id)
            .collect();
        self.summaries(&ids).await
    }

    /// Users the given user follows.
    pub async fn following(&self, username: &str) -> AppResult<Vec<UserSummary>> {
        let user = self.user_repo.get_by_username(username).await?;
        let ids: Vec<String> = self
            .following_repo
            .find_following(&user.id)
            .await?
            .into_iter()
            .map(|f| f.followee_id)
            .collect();
        self.summaries(&ids).await
    }

    async fn summaries(&self, ids: &[String]) -> AppResult<Vec<UserSummary>> {
        Ok(self
            .user_repo
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(UserSummary::from)
            .collect())
    }
}
