//! Profiles, the public user directory and account deletion.

use chrono::Utc;
use galeria_common::{AppError, AppResult, Bucket, StorageBackend, generate_storage_key};
use galeria_db::{
    entities::user,
    repositories::{
        AlbumRepository, BlockingRepository, FollowingRepository, PhotoRepository,
        ReportRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::Serialize;
use std::sync::Arc;

use crate::services::following::UserSummary;
use crate::services::media::ImageFormat;
use crate::services::photo::{PhotoService, UploadFile};

/// Photo shown for profiles without one.
pub const DEFAULT_PROFILE_PHOTO: &str = "/foto.jpeg";

/// Size of the public user directory.
const PUBLIC_USERS_LIMIT: u64 = 1000;

/// Profile as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    pub username: String,
    pub instagram: Option<String>,
    pub photo: String,
    pub description: Option<String>,
    pub followers: i32,
    pub following: i32,
}

impl From<user::Model> for ProfileView {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            instagram: user.instagram,
            photo: user
                .photo
                .unwrap_or_else(|| DEFAULT_PROFILE_PHOTO.to_string()),
            description: user.description,
            followers: user.followers_count,
            following: user.following_count,
        }
    }
}

/// Editable profile fields. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub instagram: Option<String>,
}

/// Account service for business logic.
#[derive(Clone)]
pub struct AccountService {
    user_repo: UserRepository,
    photo_repo: PhotoRepository,
    album_repo: AlbumRepository,
    blocking_repo: BlockingRepository,
    following_repo: FollowingRepository,
    report_repo: ReportRepository,
    photos: PhotoService,
    storage: Arc<dyn StorageBackend>,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: UserRepository,
        photo_repo: PhotoRepository,
        album_repo: AlbumRepository,
        blocking_repo: BlockingRepository,
        following_repo: FollowingRepository,
        report_repo: ReportRepository,
        photos: PhotoService,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            user_repo,
            photo_repo,
            album_repo,
            blocking_repo,
            following_repo,
            report_repo,
            photos,
            storage,
        }
    }

    /// Public profile. Hidden when a block exists either way, except from its owner.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<&user::Model>,
    ) -> AppResult<ProfileView> {
        let user = self.user_repo.get_by_username(username).await?;

        if let Some(viewer) = viewer.filter(|v| v.id != user.id) {
            if self
                .blocking_repo
                .is_blocked_either_way(&viewer.id, &user.id)
                .await?
            {
                return Err(AppError::Forbidden("This profile is not available".to_string()));
            }
        }

        Ok(user.into())
    }

    /// Update the session user's profile, optionally replacing the profile photo.
    pub async fn update_profile(
        &self,
        user: &user::Model,
        username: &str,
        input: UpdateProfileInput,
        photo: Option<UploadFile>,
    ) -> AppResult<ProfileView> {
        if !user.username.eq_ignore_ascii_case(username) {
            return Err(AppError::Forbidden(
                "You can only edit your own profile".to_string(),
            ));
        }

        let mut active: user::ActiveModel = user.clone().into();

        if let Some(name) = input.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description).filter(|d| !d.is_empty()));
        }
        if let Some(instagram) = input.instagram {
            active.instagram = Set(Some(instagram).filter(|i| !i.is_empty()));
        }

        if let Some(file) = photo {
            if ImageFormat::from_mime_type(&file.content_type).is_none() {
                return Err(AppError::BadRequest(
                    "Profile photo must be an image".to_string(),
                ));
            }
            let key = format!("profiles/{}", generate_storage_key(&user.id, &file.file_name));
            let stored = self
                .storage
                .upload(Bucket::Public, &key, &file.data, &file.content_type)
                .await?;
            let url = stored
                .url
                .unwrap_or_else(|| self.storage.public_url(&key));
            self.remove_profile_photo(user).await;
            active.photo = Set(Some(url));
        }

        active.updated_at = Set(Some(Utc::now().into()));
        let updated = self.user_repo.update(active).await?;
        Ok(updated.into())
    }

    /// Every user's username and photo.
    pub async fn public_users(&self) -> AppResult<Vec<UserSummary>> {
        Ok(self
            .user_repo
            .find_all(PUBLIC_USERS_LIMIT)
            .await?
            .into_iter()
            .map(UserSummary::from)
            .collect())
    }

    /// Delete the account, its stored media and everything that references it.
    pub async fn delete_account(&self, user: &user::Model) -> AppResult<()> {
        let photos = self.photo_repo.find_by_user(&user.id).await?;
        for photo in &photos {
            self.photos.delete_media(photo).await;
            self.report_repo.delete_by_item(&photo.id).await?;
        }
        for album in self.album_repo.find_by_user(&user.id).await? {
            self.report_repo.delete_by_item(&album.id).await?;
        }
        self.report_repo.delete_by_item(&user.id).await?;

        for follow in self.following_repo.find_following(&user.id).await? {
            self.user_repo.decrement_followers_count(&follow.followee_id).await?;
        }
        for follow in self.following_repo.find_followers(&user.id).await? {
            self.user_repo.decrement_following_count(&follow.follower_id).await?;
        }

        self.remove_profile_photo(user).await;

        // Photos, albums, likes, comments, unlocks, follows, blocks,
        // notifications and chats cascade from the user row.
        self.user_repo.delete(user.clone()).await?;

        tracing::info!(user_id = %user.id, photos = photos.len(), "Account deleted");
        Ok(())
    }

    async fn remove_profile_photo(&self, user: &user::Model) {
        let prefix = self.storage.public_url("");
        let Some(encoded) = user.photo.as_deref().and_then(|p| p.strip_prefix(&prefix)) else {
            return;
        };
        let Ok(key) = urlencoding::decode(encoded) else {
            return;
        };
        if let Err(e) = self.storage.delete(Bucket::Public, &key).await {
            tracing::warn!(error = %e, key = %key, "Failed to delete profile photo");
        }
    }
}
