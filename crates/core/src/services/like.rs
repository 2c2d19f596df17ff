//! Like toggling for photos and albums.

use chrono::Utc;
use galeria_common::{AppResult, IdGenerator};
use galeria_db::{
    entities::{album_like, notification::NotificationType, photo_like, user},
    repositories::{AlbumRepository, LikeRepository, PhotoRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;

use crate::services::notification::{NotificationService, NotificationTarget};

/// Like state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeSummary {
    pub likes: i32,
    pub liked_by_user: bool,
}

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    like_repo: LikeRepository,
    photo_repo: PhotoRepository,
    album_repo: AlbumRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(
        like_repo: LikeRepository,
        photo_repo: PhotoRepository,
        album_repo: AlbumRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            like_repo,
            photo_repo,
            album_repo,
            user_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like or unlike a photo. Only a new like notifies the owner.
    pub async fn toggle_photo_like(
        &self,
        user: &user::Model,
        photo_id: &str,
    ) -> AppResult<LikeSummary> {
        let photo = self.photo_repo.get_by_id(photo_id).await?;

        if self.like_repo.has_liked_photo(&user.id, &photo.id).await? {
            self.like_repo.delete_photo_like(&user.id, &photo.id).await?;
            self.photo_repo.decrement_likes_count(&photo.id).await?;
            return Ok(LikeSummary {
                likes: (photo.likes_count - 1).max(0),
                liked_by_user: false,
            });
        }

        self.like_repo
            .create_photo_like(photo_like::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user.id.clone()),
                photo_id: Set(photo.id.clone()),
                created_at: Set(Utc::now().into()),
            })
            .await?;
        self.photo_repo.increment_likes_count(&photo.id).await?;

        if photo.user_id != user.id {
            let owner = self.user_repo.get_by_id(&photo.user_id).await?;
            let target = NotificationTarget {
                reference_id: Some(photo.id.clone()),
                media_type: Some(photo.media_type),
                photo_url: photo.thumbnail_url.clone().or_else(|| photo.public_url.clone()),
            };
            if let Err(e) = self
                .notifications
                .notify(&owner, user, NotificationType::Like, target)
                .await
            {
                tracing::warn!(error = %e, photo_id = %photo.id, "Failed to create like notification");
            }
        }

        Ok(LikeSummary {
            likes: photo.likes_count + 1,
            liked_by_user: true,
        })
    }

    /// Like or unlike an album.
    pub async fn toggle_album_like(
        &self,
        user: &user::Model,
        album_id: &str,
    ) -> AppResult<LikeSummary> {
        let album = self.album_repo.get_by_id(album_id).await?;

        if self.like_repo.has_liked_album(&user.id, &album.id).await? {
            self.like_repo.delete_album_like(&user.id, &album.id).await?;
            self.album_repo.decrement_likes_count(&album.id).await?;
            return Ok(LikeSummary {
                likes: (album.likes_count - 1).max(0),
                liked_by_user: false,
            });
        }

        self.like_repo
            .create_album_like(album_like::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user.id.clone()),
                album_id: Set(album.id.clone()),
                created_at: Set(Utc::now().into()),
            })
            .await?;
        self.album_repo.increment_likes_count(&album.id).await?;

        Ok(LikeSummary {
            likes: album.likes_count + 1,
            liked_by_user: true,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::event_publisher::{StreamEvent, tests::RecordingPublisher};
    use crate::test_fixtures::{
        album_model, notification_model, photo_like_model, photo_model, user_model,
    };
    use galeria_db::repositories::NotificationRepository;
    use galeria_db::test_utils::mock;
    use sea_orm::DatabaseConnection;
    use std::sync::Arc;

    fn service(db: Arc<DatabaseConnection>, publisher: Option<Arc<RecordingPublisher>>) -> LikeService {
        let mut notifications = NotificationService::new(
            NotificationRepository::new(db.clone()),
            UserRepository::new(db.clone()),
        );
        if let Some(publisher) = publisher {
            notifications.set_event_publisher(publisher);
        }
        LikeService::new(
            LikeRepository::new(db.clone()),
            PhotoRepository::new(db.clone()),
            AlbumRepository::new(db.clone()),
            UserRepository::new(db),
            notifications,
        )
    }

    #[tokio::test]
    async fn test_like_notifies_owner() {
        let mut photo = photo_model("p1", "u1", 0.0);
        photo.likes_count = 2;
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[photo]])
                .append_query_results([Vec::<photo_like::Model>::new()])
                .append_query_results([[photo_like_model("u2", "p1")]])
                .append_exec_results([mock::exec(1)])
                .append_query_results([[user_model("u1", "alice")]])
                .append_query_results([[notification_model(
                    "n1",
                    "u1",
                    "u2",
                    NotificationType::Like,
                )]]),
        );
        let publisher = Arc::new(RecordingPublisher::default());

        let summary = service(db, Some(publisher.clone()))
            .toggle_photo_like(&user_model("u2", "bob"), "p1")
            .await
            .unwrap();

        assert_eq!(summary, LikeSummary { likes: 3, liked_by_user: true });

        let events = publisher.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "alice");
        let StreamEvent::Notification(view) = &events[0].1 else {
            panic!("expected a notification event");
        };
        assert_eq!(
            view.photo_url.as_deref(),
            Some("http://localhost:3000/files/public/p1.jpg")
        );
    }

    #[tokio::test]
    async fn test_unlike_does_not_notify() {
        let mut photo = photo_model("p1", "u1", 0.0);
        photo.likes_count = 1;
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[photo]])
                .append_query_results([[photo_like_model("u2", "p1")]])
                .append_exec_results([mock::exec(1), mock::exec(1)]),
        );
        let publisher = Arc::new(RecordingPublisher::default());

        let summary = service(db, Some(publisher.clone()))
            .toggle_photo_like(&user_model("u2", "bob"), "p1")
            .await
            .unwrap();

        assert_eq!(summary, LikeSummary { likes: 0, liked_by_user: false });
        assert!(publisher.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_liking_own_photo_skips_notification() {
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[photo_model("p1", "u1", 0.0)]])
                .append_query_results([Vec::<photo_like::Model>::new()])
                .append_query_results([[photo_like_model("u1", "p1")]])
                .append_exec_results([mock::exec(1)]),
        );

        let summary = service(db, None)
            .toggle_photo_like(&user_model("u1", "alice"), "p1")
            .await
            .unwrap();

        assert!(summary.liked_by_user);
    }

    #[tokio::test]
    async fn test_toggle_album_like() {
        let like = album_like::Model {
            id: "al1".to_string(),
            user_id: "u2".to_string(),
            album_id: "a1".to_string(),
            created_at: Utc::now().into(),
        };
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[album_model("a1", "u1", 0.0)]])
                .append_query_results([Vec::<album_like::Model>::new()])
                .append_query_results([[like]])
                .append_exec_results([mock::exec(1)]),
        );

        let summary = service(db, None)
            .toggle_album_like(&user_model("u2", "bob"), "a1")
            .await
            .unwrap();

        assert_eq!(summary, LikeSummary { likes: 1, liked_by_user: true });
    }
}
