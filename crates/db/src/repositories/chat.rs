//! Chat repository.

use std::sync::Arc;

use crate::entities::{Chat, ChatMessage, chat, chat_message};
use galeria_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, sea_query::Expr,
};

/// Order a participant pair the way chats are stored.
#[must_use]
pub fn ordered_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Chat repository for database operations.
#[derive(Clone)]
pub struct ChatRepository {
    db: Arc<DatabaseConnection>,
}

impl ChatRepository {
    /// Create a new chat repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a chat by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<chat::Model>> {
        Chat::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the chat between two users, in either order.
    pub async fn find_by_participants(&self, a: &str, b: &str) -> AppResult<Option<chat::Model>> {
        let (first, second) = ordered_pair(a, b);
        Chat::find()
            .filter(chat::Column::ParticipantA.eq(first))
            .filter(chat::Column::ParticipantB.eq(second))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new chat.
    pub async fn create(&self, model: chat::ActiveModel) -> AppResult<chat::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Chats a user takes part in, most recently active first.
    pub async fn find_by_participant(&self, user_id: &str) -> AppResult<Vec<chat::Model>> {
        Chat::find()
            .filter(
                Condition::any()
                    .add(chat::Column::ParticipantA.eq(user_id))
                    .add(chat::Column::ParticipantB.eq(user_id)),
            )
            .order_by_desc(chat::Column::UpdatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Bump a chat's activity timestamp.
    pub async fn touch(&self, chat_id: &str) -> AppResult<()> {
        Chat::update_many()
            .col_expr(chat::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(chat::Column::Id.eq(chat_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Store a message.
    pub async fn create_message(
        &self,
        model: chat_message::ActiveModel,
    ) -> AppResult<chat_message::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Messages of a chat, oldest first.
    pub async fn find_messages(&self, chat_id: &str) -> AppResult<Vec<chat_message::Model>> {
        ChatMessage::find()
            .filter(chat_message::Column::ChatId.eq(chat_id))
            .order_by_asc(chat_message::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Latest message of a chat.
    pub async fn find_last_message(
        &self,
        chat_id: &str,
    ) -> AppResult<Option<chat_message::Model>> {
        ChatMessage::find()
            .filter(chat_message::Column::ChatId.eq(chat_id))
            .order_by_desc(chat_message::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_ordered_pair() {
        assert_eq!(ordered_pair("b", "a"), ("a", "b"));
        assert_eq!(ordered_pair("a", "b"), ("a", "b"));
    }

    #[tokio::test]
    async fn test_find_by_participants() {
        let now = Utc::now();
        let chat = chat::Model {
            id: "c1".to_string(),
            participant_a: "alice".to_string(),
            participant_b: "bob".to_string(),
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[chat]])
                .into_connection(),
        );

        let repo = ChatRepository::new(db);
        let found = repo.find_by_participants("bob", "alice").await.unwrap().unwrap();

        assert!(found.has_participant("bob"));
        assert_eq!(found.other_participant("bob"), "alice");
    }
}
