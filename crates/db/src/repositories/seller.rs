//! Seller repository.

use std::sync::Arc;

use crate::entities::{Seller, seller};
use galeria_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, sea_query::OnConflict};

/// Seller repository for database operations.
#[derive(Clone)]
pub struct SellerRepository {
    db: Arc<DatabaseConnection>,
}

impl SellerRepository {
    /// Create a new seller repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the linked account of a username.
    pub async fn find_by_seller_id(&self, seller_id: &str) -> AppResult<Option<seller::Model>> {
        Seller::find()
            .filter(seller::Column::SellerId.eq(seller_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a seller, or refresh the tokens of an existing one.
    pub async fn upsert(&self, model: seller::ActiveModel) -> AppResult<()> {
        Seller::insert(model)
            .on_conflict(
                OnConflict::column(seller::Column::SellerId)
                    .update_columns([
                        seller::Column::AccessToken,
                        seller::Column::RefreshToken,
                        seller::Column::MpUserId,
                        seller::Column::ExpiresIn,
                        seller::Column::SiteId,
                        seller::Column::ObtainedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
