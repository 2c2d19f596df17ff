//! Albums: priced bundles of photos.

use chrono::{DateTime, FixedOffset, Utc};
use galeria_common::{AppError, AppResult, IdGenerator};
use galeria_db::{
    entities::{album, photo::{self, PhotoCategory}, user},
    repositories::{AlbumRepository, BlockingRepository, PhotoRepository, UnlockRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;
use std::collections::HashMap;

use crate::services::access::{self, Viewer};
use crate::services::photo::{PhotoService, PhotoView, UploadFile, UploadMeta, check_media_types};
use crate::services::unlock::UnlockService;

/// Input for creating an album.
#[derive(Debug, Clone, Default)]
pub struct CreateAlbumInput {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub currency: Option<String>,
}

/// Album as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumView {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub currency: String,
    pub likes: i32,
    pub photos: Vec<PhotoView>,
    pub is_unlocked: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl AlbumView {
    fn new(album: album::Model, photos: Vec<photo::Model>, is_unlocked: bool) -> Self {
        let photos = photos
            .into_iter()
            .map(|p| {
                let can_view = is_unlocked || access::is_free(p.price);
                PhotoView::new(p, can_view)
            })
            .collect();

        Self {
            id: album.id,
            user_id: album.user_id,
            username: album.username,
            title: album.title,
            description: album.description,
            price: album.price,
            currency: album.currency,
            likes: album.likes_count,
            photos,
            is_unlocked,
            created_at: album.created_at,
        }
    }
}

/// Album service for business logic.
#[derive(Clone)]
pub struct AlbumService {
    album_repo: AlbumRepository,
    photo_repo: PhotoRepository,
    user_repo: UserRepository,
    blocking_repo: BlockingRepository,
    unlock_repo: UnlockRepository,
    unlock: UnlockService,
    photos: PhotoService,
    id_gen: IdGenerator,
    simulate_purchases: bool,
}

impl AlbumService {
    /// Create a new album service.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        album_repo: AlbumRepository,
        photo_repo: PhotoRepository,
        user_repo: UserRepository,
        blocking_repo: BlockingRepository,
        unlock_repo: UnlockRepository,
        unlock: UnlockService,
        photos: PhotoService,
    ) -> Self {
        Self {
            album_repo,
            photo_repo,
            user_repo,
            blocking_repo,
            unlock_repo,
            unlock,
            photos,
            id_gen: IdGenerator::new(),
            simulate_purchases: false,
        }
    }

    /// Allow the simulated purchase endpoint to unlock albums without payment.
    #[must_use]
    pub const fn with_simulated_purchases(mut self, enabled: bool) -> Self {
        self.simulate_purchases = enabled;
        self
    }

    /// Create an album from uploaded files. Every file becomes a photo priced like the album.
    pub async fn create(
        &self,
        owner: &user::Model,
        files: Vec<UploadFile>,
        input: CreateAlbumInput,
    ) -> AppResult<AlbumView> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(AppError::BadRequest("Album title is required".to_string()));
        }
        if files.is_empty() {
            return Err(AppError::BadRequest("No files were uploaded for the album".to_string()));
        }
        check_media_types(&files)?;

        let price = input.price.max(0.0);
        let currency = self
            .photos
            .resolve_currency(owner, input.currency.as_deref())
            .await?;

        let album = self
            .album_repo
            .create(album::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(owner.id.clone()),
                username: Set(owner.username.clone()),
                title: Set(title.to_string()),
                description: Set(input.description.clone().filter(|d| !d.is_empty())),
                price: Set(price),
                currency: Set(currency.clone()),
                likes_count: Set(0),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        let meta = UploadMeta {
            title: None,
            description: None,
            price,
            currency: Some(currency.clone()),
        };

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            match self
                .photos
                .store_media(owner, file, &meta, &currency, PhotoCategory::Albums, Some(album.id.clone()))
                .await
            {
                Ok(photo) => stored.push(photo),
                Err(e) => {
                    self.photos.discard(stored).await;
                    let album_id = album.id.clone();
                    if let Err(cleanup) = self.album_repo.delete(album).await {
                        tracing::warn!(error = %cleanup, album_id = %album_id, "Failed to remove album");
                    }
                    return Err(e);
                }
            }
        }

        tracing::info!(album_id = %album.id, user_id = %owner.id, photos = stored.len(), "Album created");
        Ok(AlbumView::new(album, stored, true))
    }

    /// Albums of a profile, with per-viewer unlock state.
    pub async fn list_for_user(
        &self,
        viewer: &user::Model,
        username: &str,
    ) -> AppResult<Vec<AlbumView>> {
        let owner = self.user_repo.get_by_username(username).await?;
        if owner.id != viewer.id
            && self
                .blocking_repo
                .is_blocked_either_way(&viewer.id, &owner.id)
                .await?
        {
            return Err(AppError::Forbidden("Access to these albums is blocked".to_string()));
        }

        let albums = self.album_repo.find_by_user(&owner.id).await?;
        let album_ids: Vec<String> = albums.iter().map(|a| a.id.clone()).collect();

        let mut photos_by_album: HashMap<String, Vec<photo::Model>> = HashMap::new();
        for photo in self.photo_repo.find_by_albums(&album_ids).await? {
            if let Some(album_id) = photo.album_id.clone() {
                photos_by_album.entry(album_id).or_default().push(photo);
            }
        }

        let paid_ids: Vec<String> = albums
            .iter()
            .filter(|a| !access::is_free(a.price) && a.user_id != viewer.id)
            .map(|a| a.id.clone())
            .collect();
        let unlocked = self
            .unlock_repo
            .find_unlocked_album_ids(&viewer.id, &paid_ids)
            .await?;

        Ok(albums
            .into_iter()
            .map(|a| {
                let is_unlocked = access::can_view(
                    a.price,
                    &a.user_id,
                    Viewer::user(&viewer.id, unlocked.contains(&a.id)),
                );
                let photos = photos_by_album.remove(&a.id).unwrap_or_default();
                AlbumView::new(a, photos, is_unlocked)
            })
            .collect())
    }

    /// A single album with its photos.
    pub async fn get(&self, album_id: &str, viewer: Option<&user::Model>) -> AppResult<AlbumView> {
        let album = self.album_repo.get_by_id(album_id).await?;
        let photos = self.photo_repo.find_by_album(&album.id).await?;

        let unlocked = match viewer {
            Some(user) if user.id != album.user_id && !access::is_free(album.price) => {
                self.unlock.is_album_unlocked(&user.id, &album.id).await?
            }
            _ => false,
        };
        let viewer = viewer.map_or_else(Viewer::anonymous, |u| Viewer::user(&u.id, unlocked));
        let is_unlocked = access::can_view(album.price, &album.user_id, viewer);

        Ok(AlbumView::new(album, photos, is_unlocked))
    }

    /// Delete an album with its photos. Only the owner may delete.
    pub async fn delete(&self, user: &user::Model, album_id: &str) -> AppResult<()> {
        let album = self.album_repo.get_by_id(album_id).await?;
        if album.user_id != user.id {
            return Err(AppError::Forbidden("Only the owner can delete this album".to_string()));
        }

        for photo in self.photo_repo.find_by_album(&album.id).await? {
            self.photos.delete_media(&photo).await;
        }

        // Photo rows follow through the album foreign key.
        self.album_repo.delete(album).await?;
        tracing::info!(album_id = %album_id, user_id = %user.id, "Album deleted");
        Ok(())
    }

    /// Simulated purchase: unlock the album and its paid photos for the user.
    pub async fn unlock(&self, user: &user::Model, album_id: &str) -> AppResult<()> {
        if !self.simulate_purchases {
            return Err(AppError::Forbidden(
                "Albums can only be unlocked through checkout".to_string(),
            ));
        }
        let album = self.album_repo.get_by_id(album_id).await?;
        if access::is_free(album.price) {
            return Err(AppError::BadRequest(
                "This album is free and needs no unlock".to_string(),
            ));
        }
        if self.unlock.is_album_unlocked(&user.id, &album.id).await? {
            return Err(AppError::BadRequest("Album already unlocked".to_string()));
        }

        self.unlock.unlock_album(&user.id, &album).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::media::tests::png;
    use crate::test_fixtures::{album_model, photo_model, test_storage, user_model};
    use galeria_common::StorageBackend;
    use galeria_db::entities::{album_unlock, seller};
    use galeria_db::repositories::SellerRepository;
    use galeria_db::test_utils::mock;
    use sea_orm::{DatabaseConnection, Value};
    use std::sync::Arc;

    fn service(db: Arc<DatabaseConnection>, storage: Arc<dyn StorageBackend>) -> AlbumService {
        let photos = PhotoService::new(
            PhotoRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            BlockingRepository::new(db.clone()),
            UnlockRepository::new(db.clone()),
            SellerRepository::new(db.clone()),
            storage,
        );
        AlbumService::new(
            AlbumRepository::new(db.clone()),
            PhotoRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            BlockingRepository::new(db.clone()),
            UnlockRepository::new(db.clone()),
            UnlockService::new(UnlockRepository::new(db.clone()), PhotoRepository::new(db)),
            photos,
        )
        .with_simulated_purchases(true)
    }

    fn album_unlock_model(user_id: &str, album_id: &str) -> album_unlock::Model {
        album_unlock::Model {
            id: format!("au-{user_id}-{album_id}"),
            user_id: user_id.to_string(),
            album_id: album_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let db = mock::connect(mock::postgres());
        let err = service(db, test_storage("album-title"))
            .create(&user_model("u1", "alice"), vec![], CreateAlbumInput::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("title")));
    }

    #[tokio::test]
    async fn test_create_requires_files() {
        let db = mock::connect(mock::postgres());
        let err = service(db, test_storage("album-files"))
            .create(
                &user_model("u1", "alice"),
                vec![],
                CreateAlbumInput {
                    title: "Trip".to_string(),
                    ..CreateAlbumInput::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_paid_album_stores_paid_photos() {
        let owner = user_model("u1", "alice");
        let album = album_model("a1", "u1", 10.0);
        let mut stored = photo_model("p1", "u1", 10.0);
        stored.category = PhotoCategory::Albums;
        stored.album_id = Some("a1".to_string());

        let db = mock::connect(
            mock::postgres()
                .append_query_results([Vec::<seller::Model>::new()])
                .append_query_results([[album]])
                .append_query_results([[stored]]),
        );

        let view = service(db, test_storage("album-create"))
            .create(
                &owner,
                vec![UploadFile {
                    file_name: "one.png".to_string(),
                    content_type: "image/png".to_string(),
                    data: png(64, 48).into(),
                }],
                CreateAlbumInput {
                    title: "Trip".to_string(),
                    price: 10.0,
                    ..CreateAlbumInput::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(view.photos.len(), 1);
        assert!(view.photos[0].is_paid_content);
        assert_eq!(view.photos[0].album_id.as_deref(), Some("a1"));
        assert!(view.is_unlocked);
    }

    #[tokio::test]
    async fn test_list_marks_unlocked_albums() {
        let viewer = user_model("u2", "bob");
        let owner = user_model("u1", "alice");
        let mut locked_photo = photo_model("p1", "u1", 5.0);
        locked_photo.album_id = Some("a1".to_string());

        let db = mock::connect(
            mock::postgres()
                .append_query_results([[owner]])
                .append_query_results([[mock::count_row(0)]])
                .append_query_results([[album_model("a1", "u1", 5.0), album_model("a2", "u1", 5.0)]])
                .append_query_results([[locked_photo]])
                .append_query_results([[maplit::btreemap! {
                    "album_id" => Value::from("a2")
                }]]),
        );

        let albums = service(db, test_storage("album-list"))
            .list_for_user(&viewer, "alice")
            .await
            .unwrap();

        assert_eq!(albums.len(), 2);
        assert!(!albums[0].is_unlocked);
        assert_eq!(albums[0].photos.len(), 1);
        assert!(!albums[0].photos[0].is_unlocked);
        assert!(albums[1].is_unlocked);
    }

    #[tokio::test]
    async fn test_list_blocked_is_forbidden() {
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[user_model("u1", "alice")]])
                .append_query_results([[mock::count_row(1)]]),
        );

        let err = service(db, test_storage("album-blocked"))
            .list_for_user(&user_model("u2", "bob"), "alice")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_forbidden() {
        let db = mock::connect(mock::postgres().append_query_results([[album_model("a1", "u1", 0.0)]]));

        let err = service(db, test_storage("album-delete"))
            .delete(&user_model("u2", "bob"), "a1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_unlock_free_album_is_rejected() {
        let db = mock::connect(mock::postgres().append_query_results([[album_model("a1", "u1", 0.0)]]));

        let err = service(db, test_storage("album-free"))
            .unlock(&user_model("u2", "bob"), "a1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("free")));
    }

    #[tokio::test]
    async fn test_unlock_twice_is_rejected() {
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[album_model("a1", "u1", 5.0)]])
                .append_query_results([[album_unlock_model("u2", "a1")]]),
        );

        let err = service(db, test_storage("album-twice"))
            .unlock(&user_model("u2", "bob"), "a1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("already")));
    }

    #[tokio::test]
    async fn test_create_rejects_mixed_batch_before_inserting() {
        // Nothing is queued on the mock: any query would fail with a different error
        let db = mock::connect(mock::postgres());

        let err = service(db, test_storage("album-mixed"))
            .create(
                &user_model("u1", "alice"),
                vec![
                    UploadFile {
                        file_name: "one.png".to_string(),
                        content_type: "image/png".to_string(),
                        data: png(64, 48).into(),
                    },
                    UploadFile {
                        file_name: "notes.txt".to_string(),
                        content_type: "text/plain".to_string(),
                        data: "hello".into(),
                    },
                ],
                CreateAlbumInput {
                    title: "Trip".to_string(),
                    ..CreateAlbumInput::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("text/plain")));
    }

    #[tokio::test]
    async fn test_unlock_requires_simulated_purchases() {
        let db = mock::connect(mock::postgres());

        let err = service(db, test_storage("album-sim-off"))
            .with_simulated_purchases(false)
            .unlock(&user_model("u2", "bob"), "a1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_simulated_unlock_grants_album_and_paid_photos() {
        let mut paid = photo_model("p1", "u1", 5.0);
        paid.album_id = Some("a1".to_string());
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[album_model("a1", "u1", 5.0)]])
                .append_query_results([Vec::<album_unlock::Model>::new()])
                .append_exec_results([mock::exec(1)])
                .append_query_results([[paid]])
                .append_exec_results([mock::exec(1)]),
        );

        service(db, test_storage("album-sim-on"))
            .unlock(&user_model("u2", "bob"), "a1")
            .await
            .unwrap();
    }
}
