//! Seller entity (payment gateway account linked through OAuth).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "seller")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Username of the linked user
    #[sea_orm(unique)]
    pub seller_id: String,

    #[serde(skip_serializing)]
    pub access_token: String,

    #[serde(skip_serializing)]
    #[sea_orm(nullable)]
    pub refresh_token: Option<String>,

    /// Gateway account id
    pub mp_user_id: String,

    /// Token lifetime in seconds
    #[sea_orm(nullable)]
    pub expires_in: Option<i64>,

    /// Gateway site (country) id, e.g. `MLA`
    #[sea_orm(nullable)]
    pub site_id: Option<String>,

    pub obtained_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
