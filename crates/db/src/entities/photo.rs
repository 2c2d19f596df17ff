//! Photo entity (images and videos, free or paid).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where a photo is shown on its owner's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PhotoCategory {
    #[sea_orm(string_value = "gallery")]
    Gallery,
    #[sea_orm(string_value = "posts")]
    Posts,
    /// Belongs to an album and is not listed on its own.
    #[sea_orm(string_value = "albums")]
    Albums,
}

/// Kind of media stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[sea_orm(string_value = "image")]
    Image,
    #[sea_orm(string_value = "video")]
    Video,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "photo")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,

    /// Owner's username (denormalized for profile listings)
    pub username: String,

    #[sea_orm(nullable)]
    pub title: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Storage key of the original upload
    pub file_name: String,

    /// Public URL of the original; null for paid content
    #[sea_orm(nullable)]
    pub public_url: Option<String>,

    /// Blurred preview for paid images
    #[sea_orm(nullable)]
    pub blur_url: Option<String>,

    #[sea_orm(nullable)]
    pub thumbnail_url: Option<String>,

    #[sea_orm(nullable)]
    pub blurhash: Option<String>,

    /// Resized variants: `[{"width": 300, "key": "...", "url": "..."}]`
    #[sea_orm(column_type = "JsonBinary")]
    pub responsive: Json,

    pub is_paid_content: bool,

    pub category: PhotoCategory,

    #[sea_orm(nullable)]
    pub album_id: Option<String>,

    #[sea_orm(default_value = 0)]
    pub likes_count: i32,

    #[sea_orm(default_value = 0.0)]
    pub price: f64,

    pub currency: String,

    pub media_type: MediaType,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::album::Entity",
        from = "Column::AlbumId",
        to = "super::album::Column::Id",
        on_delete = "Cascade"
    )]
    Album,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::album::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Album.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
