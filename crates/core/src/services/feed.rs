//! Home feed: posts from followed users and the viewer.

use galeria_common::AppResult;
use galeria_db::{
    entities::user,
    repositories::{FollowingRepository, PhotoRepository, UnlockRepository},
};

use crate::services::access::{self, Viewer};
use crate::services::photo::PhotoView;

/// Maximum number of items in one feed page.
pub const FEED_LIMIT: u64 = 100;

/// Feed service for business logic.
#[derive(Clone)]
pub struct FeedService {
    photo_repo: PhotoRepository,
    following_repo: FollowingRepository,
    unlock_repo: UnlockRepository,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(
        photo_repo: PhotoRepository,
        following_repo: FollowingRepository,
        unlock_repo: UnlockRepository,
    ) -> Self {
        Self {
            photo_repo,
            following_repo,
            unlock_repo,
        }
    }

    /// Newest photos of everyone the user follows plus their own. Album photos are left out.
    pub async fn home(&self, user: &user::Model, until_id: Option<&str>) -> AppResult<Vec<PhotoView>> {
        let mut author_ids = self.following_repo.find_followee_ids(&user.id).await?;
        author_ids.push(user.id.clone());

        let photos = self
            .photo_repo
            .find_feed(&author_ids, FEED_LIMIT, until_id)
            .await?;

        let paid: Vec<String> = photos
            .iter()
            .filter(|p| p.is_paid_content && p.user_id != user.id)
            .map(|p| p.id.clone())
            .collect();
        let unlocked = self.unlock_repo.find_unlocked_photo_ids(&user.id, &paid).await?;

        Ok(photos
            .into_iter()
            .map(|p| {
                let is_unlocked = access::can_view(
                    p.price,
                    &p.user_id,
                    Viewer::user(&user.id, unlocked.contains(&p.id)),
                );
                PhotoView::new(p, is_unlocked)
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_fixtures::{photo_model, user_model};
    use galeria_db::test_utils::mock;
    use sea_orm::Value;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_feed_marks_unlock_state() {
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[maplit::btreemap! {
                    "followee_id" => Value::from("u1")
                }]])
                .append_query_results([[
                    photo_model("p3", "u2", 4.0),
                    photo_model("p2", "u1", 5.0),
                    photo_model("p1", "u1", 0.0),
                ]])
                .append_query_results([Vec::<BTreeMap<String, Value>>::new()]),
        );
        let service = FeedService::new(
            PhotoRepository::new(db.clone()),
            FollowingRepository::new(db.clone()),
            UnlockRepository::new(db),
        );

        let feed = service.home(&user_model("u2", "bob"), None).await.unwrap();

        assert_eq!(feed.len(), 3);
        assert!(feed[0].is_unlocked, "own paid post");
        assert!(!feed[1].is_unlocked, "paid post not bought");
        assert!(feed[2].is_unlocked, "free post");
    }

    #[tokio::test]
    async fn test_feed_includes_bought_posts() {
        let db = mock::connect(
            mock::postgres()
                .append_query_results([Vec::<BTreeMap<String, Value>>::new()])
                .append_query_results([[photo_model("p2", "u1", 5.0)]])
                .append_query_results([[maplit::btreemap! {
                    "photo_id" => Value::from("p2")
                }]]),
        );
        let service = FeedService::new(
            PhotoRepository::new(db.clone()),
            FollowingRepository::new(db.clone()),
            UnlockRepository::new(db),
        );

        let feed = service.home(&user_model("u2", "bob"), None).await.unwrap();

        assert!(feed[0].is_unlocked);
    }
}
