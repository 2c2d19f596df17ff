//! Grants access to paid content.

use galeria_common::{AppResult, IdGenerator};
use galeria_db::{
    entities::{album, photo},
    repositories::{PhotoRepository, UnlockRepository},
};

/// Adds buyers to unlock lists. Every grant is a set insert, so repeats are no-ops.
#[derive(Clone)]
pub struct UnlockService {
    unlock_repo: UnlockRepository,
    photo_repo: PhotoRepository,
    id_gen: IdGenerator,
}

impl UnlockService {
    /// Create a new unlock service.
    #[must_use]
    pub const fn new(unlock_repo: UnlockRepository, photo_repo: PhotoRepository) -> Self {
        Self {
            unlock_repo,
            photo_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Unlock one photo. Returns whether a new grant was stored.
    pub async fn unlock_photo(&self, user_id: &str, photo: &photo::Model) -> AppResult<bool> {
        let added = self
            .unlock_repo
            .unlock_photo(self.id_gen.generate(), user_id, &photo.id)
            .await?;
        tracing::info!(user_id = %user_id, photo_id = %photo.id, added, "Photo unlocked");
        Ok(added)
    }

    /// Unlock an album along with every paid photo in it.
    pub async fn unlock_album(&self, user_id: &str, album: &album::Model) -> AppResult<bool> {
        let added = self
            .unlock_repo
            .unlock_album(self.id_gen.generate(), user_id, &album.id)
            .await?;

        let photos = self.photo_repo.find_by_album(&album.id).await?;
        for photo in photos.iter().filter(|p| p.is_paid_content) {
            self.unlock_repo
                .unlock_photo(self.id_gen.generate(), user_id, &photo.id)
                .await?;
        }

        tracing::info!(user_id = %user_id, album_id = %album.id, added, "Album unlocked");
        Ok(added)
    }

    /// Whether the user holds an unlock for the album.
    pub async fn is_album_unlocked(&self, user_id: &str, album_id: &str) -> AppResult<bool> {
        self.unlock_repo.is_album_unlocked(user_id, album_id).await
    }
}
