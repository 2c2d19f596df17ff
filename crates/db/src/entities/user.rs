//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    /// Lowercased username for case-insensitive lookups.
    #[sea_orm(unique)]
    pub username_lower: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Display name.
    pub name: String,

    /// Profile picture URL.
    #[sea_orm(nullable)]
    pub photo: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Instagram handle shown on the profile.
    #[sea_orm(nullable)]
    pub instagram: Option<String>,

    #[sea_orm(default_value = 0)]
    pub followers_count: i32,

    #[sea_orm(default_value = 0)]
    pub following_count: i32,

    /// Set once the user has linked a payment account (the username).
    #[sea_orm(nullable)]
    pub seller_id: Option<String>,

    /// Payment gateway account id.
    #[sea_orm(nullable)]
    pub mp_user_id: Option<String>,

    #[serde(skip_serializing)]
    #[sea_orm(unique, nullable)]
    pub reset_password_token: Option<String>,

    #[serde(skip_serializing)]
    #[sea_orm(nullable)]
    pub reset_password_expires: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::photo::Entity")]
    Photos,

    #[sea_orm(has_many = "super::album::Entity")]
    Albums,
}

impl Related<super::photo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Photos.def()
    }
}

impl Related<super::album::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Albums.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
