//! Chat entity (a direct conversation between two users).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Lower of the two participant ids
    pub participant_a: String,

    /// Higher of the two participant ids
    pub participant_b: String,

    pub created_at: DateTimeWithTimeZone,

    /// Bumped on every message
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether the user takes part in this chat.
    #[must_use]
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participant_a == user_id || self.participant_b == user_id
    }

    /// The participant that is not `user_id`.
    #[must_use]
    pub fn other_participant(&self, user_id: &str) -> &str {
        if self.participant_a == user_id {
            &self.participant_b
        } else {
            &self.participant_a
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ParticipantA",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    ParticipantA,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ParticipantB",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    ParticipantB,

    #[sea_orm(has_many = "super::chat_message::Entity")]
    Messages,
}

impl Related<super::chat_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
