//! Comments on photos and albums.

use chrono::{DateTime, FixedOffset, Utc};
use galeria_common::{AppError, AppResult, IdGenerator};
use galeria_db::{
    entities::{comment, notification::NotificationType, user},
    repositories::{AlbumRepository, CommentRepository, PhotoRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;
use std::collections::HashMap;

use crate::services::notification::{NotificationService, NotificationTarget};

/// Author shown next to a comment.
#[derive(Debug, Clone, Serialize)]
pub struct CommentAuthor {
    pub id: String,
    pub username: String,
    pub photo: Option<String>,
}

/// Comment as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub text: String,
    pub user: Option<CommentAuthor>,
    pub created_at: DateTime<FixedOffset>,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    photo_repo: PhotoRepository,
    album_repo: AlbumRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        photo_repo: PhotoRepository,
        album_repo: AlbumRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            comment_repo,
            photo_repo,
            album_repo,
            user_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on a photo and return the photo's updated thread.
    pub async fn add_to_photo(
        &self,
        user: &user::Model,
        photo_id: &str,
        text: &str,
    ) -> AppResult<Vec<CommentView>> {
        let text = non_empty(text)?;
        let photo = self.photo_repo.get_by_id(photo_id).await?;

        self.comment_repo
            .create(comment::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user.id.clone()),
                photo_id: Set(Some(photo.id.clone())),
                album_id: Set(None),
                text: Set(text.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        if photo.user_id != user.id {
            let owner = self.user_repo.get_by_id(&photo.user_id).await?;
            let target = NotificationTarget {
                reference_id: Some(photo.id.clone()),
                media_type: Some(photo.media_type),
                photo_url: photo.thumbnail_url.clone().or_else(|| photo.public_url.clone()),
            };
            if let Err(e) = self
                .notifications
                .notify(&owner, user, NotificationType::Comment, target)
                .await
            {
                tracing::warn!(error = %e, photo_id = %photo.id, "Failed to create comment notification");
            }
        }

        self.for_photo(&photo.id).await
    }

    /// Comments of a photo, oldest first.
    pub async fn for_photo(&self, photo_id: &str) -> AppResult<Vec<CommentView>> {
        let comments = self.comment_repo.find_by_photo(photo_id).await?;
        self.with_authors(comments).await
    }

    /// Comment on an album and return the album's updated thread.
    pub async fn add_to_album(
        &self,
        user: &user::Model,
        album_id: &str,
        text: &str,
    ) -> AppResult<Vec<CommentView>> {
        let text = non_empty(text)?;
        let album = self.album_repo.get_by_id(album_id).await?;

        self.comment_repo
            .create(comment::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user.id.clone()),
                photo_id: Set(None),
                album_id: Set(Some(album.id.clone())),
                text: Set(text.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        self.for_album(&album.id).await
    }

    /// Comments of an album, oldest first.
    pub async fn for_album(&self, album_id: &str) -> AppResult<Vec<CommentView>> {
        let album = self.album_repo.get_by_id(album_id).await?;
        let comments = self.comment_repo.find_by_album(&album.id).await?;
        self.with_authors(comments).await
    }

    async fn with_authors(&self, comments: Vec<comment::Model>) -> AppResult<Vec<CommentView>> {
        let mut author_ids: Vec<String> = comments.iter().map(|c| c.user_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(comments
            .into_iter()
            .map(|c| CommentView {
                user: authors.get(&c.user_id).map(|u| CommentAuthor {
                    id: u.id.clone(),
                    username: u.username.clone(),
                    photo: u.photo.clone(),
                }),
                id: c.id,
                text: c.text,
                created_at: c.created_at,
            })
            .collect())
    }
}

fn non_empty(text: &str) -> AppResult<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("Comment text is required".to_string()));
    }
    Ok(text)
}
