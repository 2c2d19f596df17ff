//! Photo and video posts.

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Utc};
use galeria_common::{
    AppError, AppResult, Bucket, IdGenerator, StorageBackend, generate_storage_key, variant_key,
};
use galeria_db::{
    entities::{
        photo::{self, MediaType, PhotoCategory},
        user,
    },
    repositories::{BlockingRepository, PhotoRepository, SellerRepository, UnlockRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::services::access::{self, Viewer};
use crate::services::media::{self, ImageFormat};
use crate::services::seller::currency_for_site;

/// Lifetime of signed URLs handed out for private media.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(3600);

/// Currency used when neither the seller account nor the request names one.
pub const DEFAULT_CURRENCY: &str = "ARS";

/// A file received from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Metadata sent along with uploaded files.
#[derive(Debug, Clone, Default)]
pub struct UploadMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub currency: Option<String>,
}

/// One stored responsive width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveVariant {
    pub width: u32,
    pub key: String,
    /// Public URL, absent for paid content.
    pub url: Option<String>,
}

/// A photo as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoView {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_name: String,
    pub public_url: Option<String>,
    pub blur_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub blurhash: Option<String>,
    pub responsive: Vec<ResponsiveVariant>,
    pub is_paid_content: bool,
    pub category: PhotoCategory,
    pub album_id: Option<String>,
    pub likes: i32,
    pub price: f64,
    pub currency: String,
    pub media_type: MediaType,
    pub is_unlocked: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl PhotoView {
    /// Build the view; `is_unlocked` is whether the viewer may see the full media.
    #[must_use]
    pub fn new(photo: photo::Model, is_unlocked: bool) -> Self {
        let responsive = serde_json::from_value(photo.responsive).unwrap_or_default();
        Self {
            id: photo.id,
            user_id: photo.user_id,
            username: photo.username,
            title: photo.title,
            description: photo.description,
            file_name: photo.file_name,
            public_url: photo.public_url,
            blur_url: photo.blur_url,
            thumbnail_url: photo.thumbnail_url,
            blurhash: photo.blurhash,
            responsive,
            is_paid_content: photo.is_paid_content,
            category: photo.category,
            album_id: photo.album_id,
            likes: photo.likes_count,
            price: photo.price,
            currency: photo.currency,
            media_type: photo.media_type,
            is_unlocked,
            created_at: photo.created_at,
        }
    }

    /// Report the item as free.
    #[must_use]
    pub const fn with_zero_price(mut self) -> Self {
        self.price = 0.0;
        self
    }
}

/// Classify an upload by its MIME type.
pub fn media_type_of(content_type: &str) -> AppResult<MediaType> {
    if media::is_video(content_type) {
        Ok(MediaType::Video)
    } else if ImageFormat::from_mime_type(content_type).is_some() {
        Ok(MediaType::Image)
    } else {
        Err(AppError::BadRequest(format!(
            "Unsupported file type: {content_type}"
        )))
    }
}

/// Reject the batch when any file is neither an image nor a video.
pub fn check_media_types(files: &[UploadFile]) -> AppResult<()> {
    files
        .iter()
        .try_for_each(|f| media_type_of(&f.content_type).map(|_| ()))
}

/// Photo service for business logic.
#[derive(Clone)]
pub struct PhotoService {
    photo_repo: PhotoRepository,
    user_repo: UserRepository,
    blocking_repo: BlockingRepository,
    unlock_repo: UnlockRepository,
    seller_repo: SellerRepository,
    storage: Arc<dyn StorageBackend>,
    id_gen: IdGenerator,
}

impl PhotoService {
    /// Create a new photo service.
    #[must_use]
    pub const fn new(
        photo_repo: PhotoRepository,
        user_repo: UserRepository,
        blocking_repo: BlockingRepository,
        unlock_repo: UnlockRepository,
        seller_repo: SellerRepository,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            photo_repo,
            user_repo,
            blocking_repo,
            unlock_repo,
            seller_repo,
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Upload files into the owner's gallery or posts.
    pub async fn upload(
        &self,
        owner: &user::Model,
        username: &str,
        category: &str,
        files: Vec<UploadFile>,
        meta: UploadMeta,
    ) -> AppResult<Vec<PhotoView>> {
        if !owner.username.eq_ignore_ascii_case(username) {
            return Err(AppError::Forbidden(
                "Cannot upload to another user's profile".to_string(),
            ));
        }

        let category = match category {
            "gallery" => PhotoCategory::Gallery,
            "posts" => PhotoCategory::Posts,
            other => return Err(AppError::BadRequest(format!("Invalid category: {other}"))),
        };

        if files.is_empty() {
            return Err(AppError::BadRequest("No file uploaded".to_string()));
        }
        check_media_types(&files)?;

        let currency = self.resolve_currency(owner, meta.currency.as_deref()).await?;

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            match self
                .store_media(owner, file, &meta, &currency, category, None)
                .await
            {
                Ok(photo) => stored.push(photo),
                Err(e) => {
                    self.discard(stored).await;
                    return Err(e);
                }
            }
        }

        tracing::info!(user_id = %owner.id, count = stored.len(), "Media uploaded");
        Ok(stored.into_iter().map(|p| PhotoView::new(p, true)).collect())
    }

    /// Roll back photos stored earlier in a failed upload.
    pub(crate) async fn discard(&self, photos: Vec<photo::Model>) {
        for photo in photos {
            self.delete_media(&photo).await;
            let id = photo.id.clone();
            if let Err(e) = self.photo_repo.delete(photo).await {
                tracing::warn!(error = %e, photo_id = %id, "Failed to remove photo record");
            }
        }
    }

    /// Currency for new content: the linked seller account's, else the requested one.
    pub async fn resolve_currency(
        &self,
        owner: &user::Model,
        requested: Option<&str>,
    ) -> AppResult<String> {
        if let Some(seller) = self.seller_repo.find_by_seller_id(&owner.username).await? {
            return Ok(currency_for_site(seller.site_id.as_deref()).to_string());
        }
        Ok(requested
            .filter(|c| !c.trim().is_empty())
            .map_or_else(|| DEFAULT_CURRENCY.to_string(), |c| c.trim().to_uppercase()))
    }

    /// Store one uploaded file and create its record.
    pub async fn store_media(
        &self,
        owner: &user::Model,
        file: UploadFile,
        meta: &UploadMeta,
        currency: &str,
        category: PhotoCategory,
        album_id: Option<String>,
    ) -> AppResult<photo::Model> {
        let paid = !access::is_free(meta.price);
        let bucket = if paid { Bucket::Private } else { Bucket::Public };
        let key = generate_storage_key(&owner.id, &file.file_name);
        let media_type = media_type_of(&file.content_type)?;

        let mut responsive = Vec::new();
        let mut blur_url = None;
        let mut blurhash = None;

        if media_type == MediaType::Image {
            let processed = media::process_image(file.data.to_vec(), paid).await?;

            for variant in processed.variants {
                let variant_key = variant_key(&key, &format!("w{}", variant.width), "jpg");
                let stored = self
                    .storage
                    .upload(bucket, &variant_key, &variant.data, "image/jpeg")
                    .await?;
                responsive.push(ResponsiveVariant {
                    width: variant.width,
                    key: variant_key,
                    url: stored.url,
                });
            }

            if let Some(blur) = processed.blur {
                let blur_key = variant_key(&key, "blur", "jpg");
                let stored = self
                    .storage
                    .upload(Bucket::Public, &blur_key, &blur, "image/jpeg")
                    .await?;
                blur_url = stored.url;
            }

            blurhash = processed.blurhash;
        }

        let original = self
            .storage
            .upload(bucket, &key, &file.data, &file.content_type)
            .await?;

        let public_url = if paid { None } else { original.url };
        let thumbnail_url = if paid {
            blur_url.clone()
        } else {
            responsive
                .first()
                .and_then(|v| v.url.clone())
                .or_else(|| public_url.clone())
        };

        let model = photo::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(owner.id.clone()),
            username: Set(owner.username.clone()),
            title: Set(meta.title.clone().filter(|t| !t.is_empty())),
            description: Set(meta.description.clone().filter(|d| !d.is_empty())),
            file_name: Set(key),
            public_url: Set(public_url),
            blur_url: Set(blur_url),
            thumbnail_url: Set(thumbnail_url),
            blurhash: Set(blurhash),
            responsive: Set(serde_json::to_value(&responsive)
                .map_err(|e| AppError::Internal(e.to_string()))?),
            is_paid_content: Set(paid),
            category: Set(category),
            album_id: Set(album_id),
            likes_count: Set(0),
            price: Set(meta.price.max(0.0)),
            currency: Set(currency.to_string()),
            media_type: Set(media_type),
            created_at: Set(Utc::now().into()),
        };

        self.photo_repo.create(model).await
    }

    /// Gallery section of a profile.
    pub async fn gallery(&self, viewer: &user::Model, username: &str) -> AppResult<Vec<PhotoView>> {
        let owner = self.visible_owner(viewer, username).await?;
        let photos = self
            .photo_repo
            .find_by_user_and_category(&owner.id, PhotoCategory::Gallery)
            .await?;
        let unlocked = self.unlocked_among(&viewer.id, &photos).await?;

        Ok(photos
            .into_iter()
            .map(|p| {
                let can_view = access::can_view(
                    p.price,
                    &p.user_id,
                    Viewer::user(&viewer.id, unlocked.contains(&p.id)),
                );
                PhotoView::new(p, can_view)
            })
            .collect())
    }

    /// Posts section of a profile. Items the viewer bought report a zero price.
    pub async fn posts(&self, viewer: &user::Model, username: &str) -> AppResult<Vec<PhotoView>> {
        let owner = self.visible_owner(viewer, username).await?;
        let photos = self
            .photo_repo
            .find_by_user_and_category(&owner.id, PhotoCategory::Posts)
            .await?;
        let unlocked = self.unlocked_among(&viewer.id, &photos).await?;

        Ok(photos
            .into_iter()
            .map(|p| {
                let is_owner = p.user_id == viewer.id;
                let bought = unlocked.contains(&p.id);
                let can_view = access::can_view(p.price, &p.user_id, Viewer::user(&viewer.id, bought));
                let view = PhotoView::new(p, can_view);
                if !is_owner && bought {
                    view.with_zero_price()
                } else {
                    view
                }
            })
            .collect())
    }

    /// A single photo. The price is reported as zero to its owner and buyers.
    pub async fn get(&self, photo_id: &str, viewer: Option<&user::Model>) -> AppResult<PhotoView> {
        let photo = self.photo_repo.get_by_id(photo_id).await?;
        let viewer = self.viewer_for(&photo, viewer).await?;
        let can_view = access::can_view(photo.price, &photo.user_id, viewer);
        let priced_for_viewer = viewer.owns(&photo.user_id) || viewer.unlocked;

        let view = PhotoView::new(photo, can_view);
        Ok(if priced_for_viewer {
            view.with_zero_price()
        } else {
            view
        })
    }

    /// Public thumbnail location of a free photo.
    pub async fn thumbnail_url(&self, photo_id: &str) -> AppResult<String> {
        let photo = self.photo_repo.get_by_id(photo_id).await?;
        if photo.is_paid_content {
            return Err(AppError::Forbidden("Content is paid".to_string()));
        }
        photo
            .public_url
            .or(photo.thumbnail_url)
            .ok_or_else(|| AppError::NotFound("Thumbnail not available".to_string()))
    }

    /// Location of the full media for the viewer.
    pub async fn media_url(&self, photo_id: &str, viewer: Option<&user::Model>) -> AppResult<String> {
        let photo = self.photo_repo.get_by_id(photo_id).await?;

        if !photo.is_paid_content {
            return photo
                .public_url
                .ok_or_else(|| AppError::BadRequest("Photo has no public URL".to_string()));
        }

        let Some(user) = viewer else {
            return Err(AppError::Unauthorized);
        };

        let is_owner = photo.user_id == user.id;
        if !is_owner
            && !self
                .unlock_repo
                .is_photo_unlocked(&user.id, &photo.id)
                .await?
        {
            return Err(AppError::Forbidden("Content is locked".to_string()));
        }

        self.storage.signed_url(&photo.file_name, SIGNED_URL_TTL).await
    }

    /// Delete a photo and its stored objects. Only the owner may delete.
    pub async fn delete(&self, user: &user::Model, photo_id: &str) -> AppResult<()> {
        let photo = self.photo_repo.get_by_id(photo_id).await?;
        if photo.user_id != user.id {
            return Err(AppError::Forbidden(
                "Only the owner can delete this photo".to_string(),
            ));
        }

        self.delete_media(&photo).await;
        self.photo_repo.delete(photo).await?;
        tracing::info!(photo_id = %photo_id, user_id = %user.id, "Photo deleted");
        Ok(())
    }

    /// Remove the stored objects of a photo. Failures are logged.
    pub async fn delete_media(&self, photo: &photo::Model) {
        let bucket = if photo.is_paid_content {
            Bucket::Private
        } else {
            Bucket::Public
        };

        let variants: Vec<ResponsiveVariant> =
            serde_json::from_value(photo.responsive.clone()).unwrap_or_default();

        let mut objects: Vec<(Bucket, String)> = vec![(bucket, photo.file_name.clone())];
        objects.extend(variants.into_iter().map(|v| (bucket, v.key)));
        if photo.blur_url.is_some() {
            objects.push((Bucket::Public, variant_key(&photo.file_name, "blur", "jpg")));
        }

        for (bucket, key) in objects {
            if let Err(e) = self.storage.delete(bucket, &key).await {
                tracing::warn!(error = %e, key = %key, "Failed to delete stored object");
            }
        }
    }

    /// Resolve a profile owner and refuse when a block exists either way.
    async fn visible_owner(&self, viewer: &user::Model, username: &str) -> AppResult<user::Model> {
        let owner = self.user_repo.get_by_username(username).await?;
        if owner.id != viewer.id
            && self
                .blocking_repo
                .is_blocked_either_way(&viewer.id, &owner.id)
                .await?
        {
            return Err(AppError::Forbidden("Access to this profile is blocked".to_string()));
        }
        Ok(owner)
    }

    async fn unlocked_among(
        &self,
        viewer_id: &str,
        photos: &[photo::Model],
    ) -> AppResult<HashSet<String>> {
        let paid: Vec<String> = photos
            .iter()
            .filter(|p| p.is_paid_content && p.user_id != viewer_id)
            .map(|p| p.id.clone())
            .collect();
        self.unlock_repo
            .find_unlocked_photo_ids(viewer_id, &paid)
            .await
    }

    async fn viewer_for<'a>(
        &self,
        photo: &photo::Model,
        viewer: Option<&'a user::Model>,
    ) -> AppResult<Viewer<'a>> {
        let Some(user) = viewer else {
            return Ok(Viewer::anonymous());
        };
        let unlocked = photo.is_paid_content
            && photo.user_id != user.id
            && self.unlock_repo.is_photo_unlocked(&user.id, &photo.id).await?;
        Ok(Viewer::user(&user.id, unlocked))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::media::tests::png;
    use crate::test_fixtures::{
        photo_model, photo_unlock_model, seller_model, stored_files, test_storage, user_model,
    };
    use galeria_db::entities::{photo_unlock, seller};
    use galeria_db::test_utils::mock;
    use sea_orm::DatabaseConnection;

    fn service(db: Arc<DatabaseConnection>, storage: Arc<dyn StorageBackend>) -> PhotoService {
        PhotoService::new(
            PhotoRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            BlockingRepository::new(db.clone()),
            UnlockRepository::new(db.clone()),
            SellerRepository::new(db),
            storage,
        )
    }

    #[tokio::test]
    async fn test_upload_to_other_profile_is_forbidden() {
        let db = mock::connect(mock::postgres());
        let alice = user_model("u1", "alice");

        let err = service(db, test_storage("photo-forbidden"))
            .upload(&alice, "bob", "posts", vec![], UploadMeta::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_category() {
        let db = mock::connect(mock::postgres());
        let alice = user_model("u1", "alice");

        let err = service(db, test_storage("photo-category"))
            .upload(&alice, "alice", "albums", vec![], UploadMeta::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_upload_rejects_mixed_batch_before_storing() {
        // No seller lookup or insert is queued on the mock
        let db = mock::connect(mock::postgres());
        let _ = std::fs::remove_dir_all(std::env::temp_dir().join("galeria-photo-mixed"));
        let alice = user_model("u1", "alice");

        let err = service(db, test_storage("photo-mixed"))
            .upload(
                &alice,
                "alice",
                "posts",
                vec![
                    UploadFile {
                        file_name: "one.png".to_string(),
                        content_type: "image/png".to_string(),
                        data: Bytes::from(png(32, 32)),
                    },
                    UploadFile {
                        file_name: "notes.txt".to_string(),
                        content_type: "text/plain".to_string(),
                        data: Bytes::from_static(b"hello"),
                    },
                ],
                UploadMeta::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("Unsupported")));
        assert!(stored_files("photo-mixed").is_empty());
    }

    #[test]
    fn test_media_type_of() {
        assert_eq!(media_type_of("image/png").unwrap(), MediaType::Image);
        assert_eq!(media_type_of("video/mp4").unwrap(), MediaType::Video);
        assert!(media_type_of("application/pdf").is_err());
    }

    #[tokio::test]
    async fn test_store_media_keys_by_owner_id() {
        let db = mock::connect(mock::postgres().append_query_results([[photo_model("p1", "u9", 0.0)]]));
        let _ = std::fs::remove_dir_all(std::env::temp_dir().join("galeria-photo-key"));
        let owner = user_model("u9", "ana?x#1");

        service(db, test_storage("photo-key"))
            .store_media(
                &owner,
                UploadFile {
                    file_name: "pic.png".to_string(),
                    content_type: "image/png".to_string(),
                    data: Bytes::from(png(32, 32)),
                },
                &UploadMeta::default(),
                "ARS",
                PhotoCategory::Posts,
                None,
            )
            .await
            .unwrap();

        let files = stored_files("photo-key");
        assert!(!files.is_empty());
        assert!(files.iter().all(|f| f.contains("/u9/") && !f.contains("ana")));
    }

    #[tokio::test]
    async fn test_currency_prefers_linked_seller() {
        let db = mock::connect(
            mock::postgres().append_query_results([[seller_model("alice", Some("MLB"))]]),
        );
        let alice = user_model("u1", "alice");

        let currency = service(db, test_storage("photo-currency"))
            .resolve_currency(&alice, Some("USD"))
            .await
            .unwrap();

        assert_eq!(currency, "BRL");
    }

    #[tokio::test]
    async fn test_currency_defaults_to_ars() {
        let db = mock::connect(
            mock::postgres().append_query_results([Vec::<seller::Model>::new()]),
        );
        let alice = user_model("u1", "alice");

        let currency = service(db, test_storage("photo-currency-default"))
            .resolve_currency(&alice, None)
            .await
            .unwrap();

        assert_eq!(currency, DEFAULT_CURRENCY);
    }

    #[tokio::test]
    async fn test_store_paid_image_hides_urls() {
        let mut stored = photo_model("p1", "u1", 10.0);
        stored.public_url = None;
        let db = mock::connect(mock::postgres().append_query_results([[stored]]));
        let storage = test_storage("photo-paid");
        let alice = user_model("u1", "alice");

        let file = UploadFile {
            file_name: "beach.png".to_string(),
            content_type: "image/png".to_string(),
            data: Bytes::from(png(700, 400)),
        };
        let meta = UploadMeta {
            price: 10.0,
            ..UploadMeta::default()
        };

        let photo = service(db, storage)
            .store_media(&alice, file, &meta, "ARS", PhotoCategory::Posts, None)
            .await
            .unwrap();
        assert_eq!(photo.id, "p1");
        assert!(photo.public_url.is_none());
    }

    #[tokio::test]
    async fn test_media_url_free_photo_returns_public_url() {
        let photo = photo_model("p1", "u1", 0.0);
        let db = mock::connect(mock::postgres().append_query_results([[photo]]));

        let url = service(db, test_storage("photo-url-free"))
            .media_url("p1", None)
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/files/public/p1.jpg");
    }

    #[tokio::test]
    async fn test_media_url_paid_requires_session() {
        let photo = photo_model("p1", "u1", 5.0);
        let db = mock::connect(mock::postgres().append_query_results([[photo]]));

        let err = service(db, test_storage("photo-url-anon"))
            .media_url("p1", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_media_url_paid_locked_is_forbidden() {
        let photo = photo_model("p1", "u1", 5.0);
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[photo]])
                .append_query_results([Vec::<photo_unlock::Model>::new()]),
        );
        let bob = user_model("u2", "bob");

        let err = service(db, test_storage("photo-url-locked"))
            .media_url("p1", Some(&bob))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_media_url_owner_gets_signed_url() {
        let photo = photo_model("p1", "u1", 5.0);
        let db = mock::connect(mock::postgres().append_query_results([[photo]]));
        let alice = user_model("u1", "alice");

        let url = service(db, test_storage("photo-url-owner"))
            .media_url("p1", Some(&alice))
            .await
            .unwrap();

        assert!(url.contains("/private/"));
        assert!(url.contains("signature="));
    }

    #[tokio::test]
    async fn test_thumbnail_of_paid_photo_is_forbidden() {
        let photo = photo_model("p1", "u1", 5.0);
        let db = mock::connect(mock::postgres().append_query_results([[photo]]));

        let err = service(db, test_storage("photo-thumb"))
            .thumbnail_url("p1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_get_reports_zero_price_to_buyer() {
        let photo = photo_model("p1", "u1", 5.0);
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[photo]])
                .append_query_results([[photo_unlock_model("u2", "p1")]]),
        );
        let bob = user_model("u2", "bob");

        let view = service(db, test_storage("photo-get"))
            .get("p1", Some(&bob))
            .await
            .unwrap();

        assert!(view.is_unlocked);
        assert!(view.price.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_gallery_blocked_is_forbidden() {
        let bob = user_model("u2", "bob");
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[bob]])
                .append_query_results([[mock::count_row(1)]]),
        );
        let alice = user_model("u1", "alice");

        let err = service(db, test_storage("photo-gallery-blocked"))
            .gallery(&alice, "bob")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_forbidden() {
        let photo = photo_model("p1", "u1", 0.0);
        let db = mock::connect(mock::postgres().append_query_results([[photo]]));
        let bob = user_model("u2", "bob");

        let err = service(db, test_storage("photo-delete"))
            .delete(&bob, "p1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
