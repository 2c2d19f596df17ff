//! One-to-one chats.

use chrono::{DateTime, FixedOffset, Utc};
use galeria_common::{AppError, AppResult, IdGenerator};
use galeria_db::{
    entities::{chat, chat_message, user},
    repositories::{BlockingRepository, ChatRepository, UserRepository, ordered_pair},
};
use sea_orm::Set;
use serde::Serialize;
use std::collections::HashMap;

use crate::services::event_publisher::EventPublisherService;
use crate::services::following::UserSummary;

/// Chat message as returned to clients and pushed over the stream.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageView {
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub sender_username: Option<String>,
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
}

impl ChatMessageView {
    fn new(message: chat_message::Model, sender_username: Option<String>) -> Self {
        Self {
            id: message.id,
            chat_id: message.chat_id,
            sender_id: message.sender_id,
            sender_username,
            content: message.content,
            created_at: message.created_at,
        }
    }
}

/// Chat entry in the inbox.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub id: String,
    pub participants: Vec<String>,
    pub other_user: Option<UserSummary>,
    pub last_message: Option<ChatMessageView>,
    pub updated_at: DateTime<FixedOffset>,
}

/// A chat with its full history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDetail {
    pub id: String,
    pub participants: Vec<String>,
    pub other_user: Option<UserSummary>,
    pub messages: Vec<ChatMessageView>,
}

/// Chat service for business logic.
#[derive(Clone)]
pub struct ChatService {
    chat_repo: ChatRepository,
    user_repo: UserRepository,
    blocking_repo: BlockingRepository,
    event_publisher: Option<EventPublisherService>,
    id_gen: IdGenerator,
}

impl ChatService {
    /// Create a new chat service.
    #[must_use]
    pub const fn new(
        chat_repo: ChatRepository,
        user_repo: UserRepository,
        blocking_repo: BlockingRepository,
    ) -> Self {
        Self {
            chat_repo,
            user_repo,
            blocking_repo,
            event_publisher: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    /// Chats of a user, most recently active first.
    pub async fn list(&self, user: &user::Model) -> AppResult<Vec<ChatSummary>> {
        let chats = self.chat_repo.find_by_participant(&user.id).await?;

        let other_ids: Vec<String> = chats
            .iter()
            .map(|c| c.other_participant(&user.id).to_string())
            .collect();
        let mut others: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&other_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let mut summaries = Vec::with_capacity(chats.len());
        for chat in chats {
            let last_message = self
                .chat_repo
                .find_last_message(&chat.id)
                .await?
                .map(|m| {
                    let sender = if m.sender_id == user.id {
                        Some(user.username.clone())
                    } else {
                        others.get(&m.sender_id).map(|u| u.username.clone())
                    };
                    ChatMessageView::new(m, sender)
                });
            let other = others.remove(chat.other_participant(&user.id));

            summaries.push(ChatSummary {
                participants: vec![chat.participant_a.clone(), chat.participant_b.clone()],
                other_user: other.map(UserSummary::from),
                last_message,
                updated_at: chat.updated_at,
                id: chat.id,
            });
        }

        Ok(summaries)
    }

    /// Open the chat with a user, creating it on first contact.
    ///
    /// Returns the chat and whether it was created.
    pub async fn start(&self, user: &user::Model, recipient_id: &str) -> AppResult<(ChatSummary, bool)> {
        if user.id == recipient_id {
            return Err(AppError::BadRequest("Cannot start a chat with yourself".to_string()));
        }

        let recipient = self.user_repo.get_by_id(recipient_id).await?;
        self.ensure_not_blocked(&user.id, &recipient.id).await?;

        let (chat, created) = match self
            .chat_repo
            .find_by_participants(&user.id, &recipient.id)
            .await?
        {
            Some(chat) => (chat, false),
            None => {
                let (participant_a, participant_b) = ordered_pair(&user.id, &recipient.id);
                let now = Utc::now();
                let chat = self
                    .chat_repo
                    .create(chat::ActiveModel {
                        id: Set(self.id_gen.generate()),
                        participant_a: Set(participant_a.to_string()),
                        participant_b: Set(participant_b.to_string()),
                        created_at: Set(now.into()),
                        updated_at: Set(now.into()),
                    })
                    .await?;
                tracing::info!(chat_id = %chat.id, "Chat created");
                (chat, true)
            }
        };

        Ok((
            ChatSummary {
                id: chat.id,
                participants: vec![chat.participant_a, chat.participant_b],
                other_user: Some(recipient.into()),
                last_message: None,
                updated_at: chat.updated_at,
            },
            created,
        ))
    }

    /// A chat and its messages, oldest first. Only participants may read it.
    pub async fn get(&self, user: &user::Model, chat_id: &str) -> AppResult<ChatDetail> {
        let chat = self.participant_chat(&user.id, chat_id).await?;
        let other = self
            .user_repo
            .find_by_id(chat.other_participant(&user.id))
            .await?;

        let messages = self
            .chat_repo
            .find_messages(&chat.id)
            .await?
            .into_iter()
            .map(|m| {
                let sender = if m.sender_id == user.id {
                    Some(user.username.clone())
                } else {
                    other.as_ref().map(|o| o.username.clone())
                };
                ChatMessageView::new(m, sender)
            })
            .collect();

        Ok(ChatDetail {
            id: chat.id,
            participants: vec![chat.participant_a, chat.participant_b],
            other_user: other.map(UserSummary::from),
            messages,
        })
    }

    /// Store a message and push it to the chat room and the recipient.
    pub async fn send_message(
        &self,
        sender: &user::Model,
        chat_id: &str,
        content: &str,
    ) -> AppResult<ChatMessageView> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::BadRequest("Message content is required".to_string()));
        }

        let chat = self.participant_chat(&sender.id, chat_id).await?;
        let recipient_id = chat.other_participant(&sender.id).to_string();
        self.ensure_not_blocked(&sender.id, &recipient_id).await?;

        let message = self
            .chat_repo
            .create_message(chat_message::ActiveModel {
                id: Set(self.id_gen.generate()),
                chat_id: Set(chat.id.clone()),
                sender_id: Set(sender.id.clone()),
                content: Set(content.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;
        self.chat_repo.touch(&chat.id).await?;

        let view = ChatMessageView::new(message, Some(sender.username.clone()));

        if let Some(ref publisher) = self.event_publisher {
            if let Some(recipient) = self.user_repo.find_by_id(&recipient_id).await? {
                if let Err(e) = publisher
                    .publish_chat_message(&chat.id, &recipient.username, &view)
                    .await
                {
                    tracing::warn!(error = %e, chat_id = %chat.id, "Failed to publish chat message");
                }
            }
        }

        Ok(view)
    }

    /// Whether the user takes part in the chat.
    pub async fn is_participant(&self, user_id: &str, chat_id: &str) -> AppResult<bool> {
        Ok(self
            .chat_repo
            .find_by_id(chat_id)
            .await?
            .is_some_and(|c| c.has_participant(user_id)))
    }

    async fn participant_chat(&self, user_id: &str, chat_id: &str) -> AppResult<chat::Model> {
        self.chat_repo
            .find_by_id(chat_id)
            .await?
            .filter(|c| c.has_participant(user_id))
            .ok_or_else(|| AppError::NotFound(format!("Chat {chat_id}")))
    }

    async fn ensure_not_blocked(&self, a: &str, b: &str) -> AppResult<()> {
        if self.blocking_repo.is_blocked_either_way(a, b).await? {
            return Err(AppError::Forbidden("You cannot message this user".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::event_publisher::{StreamEvent, tests::RecordingPublisher};
    use crate::test_fixtures::{chat_message_model, chat_model, user_model};
    use galeria_db::test_utils::mock;
    use sea_orm::DatabaseConnection;
    use std::sync::Arc;

    fn service(db: Arc<DatabaseConnection>) -> ChatService {
        ChatService::new(
            ChatRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            BlockingRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_start_with_self_is_rejected() {
        let db = mock::connect(mock::postgres());
        let err = service(db)
            .start(&user_model("u1", "alice"), "u1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_start_missing_recipient() {
        let db = mock::connect(mock::postgres().append_query_results([Vec::<user::Model>::new()]));
        let err = service(db)
            .start(&user_model("u1", "alice"), "ghost")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_start_blocked_is_forbidden() {
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[user_model("u2", "bob")]])
                .append_query_results([[mock::count_row(1)]]),
        );
        let err = service(db)
            .start(&user_model("u1", "alice"), "u2")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_start_reuses_existing_chat() {
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[user_model("u2", "bob")]])
                .append_query_results([[mock::count_row(0)]])
                .append_query_results([[chat_model("c1", "u2", "u1")]]),
        );

        let (chat, created) = service(db)
            .start(&user_model("u1", "alice"), "u2")
            .await
            .unwrap();

        assert!(!created);
        assert_eq!(chat.id, "c1");
        assert_eq!(chat.participants, vec!["u1".to_string(), "u2".to_string()]);
    }

    #[tokio::test]
    async fn test_start_creates_chat() {
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[user_model("u2", "bob")]])
                .append_query_results([[mock::count_row(0)]])
                .append_query_results([Vec::<chat::Model>::new()])
                .append_query_results([[chat_model("c1", "u1", "u2")]]),
        );

        let (chat, created) = service(db)
            .start(&user_model("u1", "alice"), "u2")
            .await
            .unwrap();

        assert!(created);
        assert_eq!(chat.other_user.unwrap().username, "bob");
    }

    #[tokio::test]
    async fn test_get_requires_participant() {
        let db = mock::connect(mock::postgres().append_query_results([[chat_model("c1", "u2", "u3")]]));
        let err = service(db)
            .get(&user_model("u1", "alice"), "c1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_returns_messages_with_senders() {
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[chat_model("c1", "u1", "u2")]])
                .append_query_results([[user_model("u2", "bob")]])
                .append_query_results([[
                    chat_message_model("m1", "c1", "u2", "hola"),
                    chat_message_model("m2", "c1", "u1", "buenas"),
                ]]),
        );

        let detail = service(db)
            .get(&user_model("u1", "alice"), "c1")
            .await
            .unwrap();

        assert_eq!(detail.messages.len(), 2);
        assert_eq!(detail.messages[0].sender_username.as_deref(), Some("bob"));
        assert_eq!(detail.messages[1].sender_username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_send_empty_message_is_rejected() {
        let db = mock::connect(mock::postgres());
        let err = service(db)
            .send_message(&user_model("u1", "alice"), "c1", "  ")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_send_message_publishes_to_chat_and_recipient() {
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[chat_model("c1", "u1", "u2")]])
                .append_query_results([[mock::count_row(0)]])
                .append_query_results([[chat_message_model("m1", "c1", "u1", "hola")]])
                .append_exec_results([mock::exec(1)])
                .append_query_results([[user_model("u2", "bob")]]),
        );
        let publisher = Arc::new(RecordingPublisher::default());
        let mut service = service(db);
        service.set_event_publisher(publisher.clone());

        let message = service
            .send_message(&user_model("u1", "alice"), "c1", "hola")
            .await
            .unwrap();
        assert_eq!(message.sender_username.as_deref(), Some("alice"));

        let events = publisher.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, "c1");
        assert!(matches!(events[0].1, StreamEvent::ReceiveMessage(_)));
        assert_eq!(events[1].0, "bob");
        assert!(matches!(events[1].1, StreamEvent::NewMessage(_)));
    }

    #[tokio::test]
    async fn test_list_includes_last_message() {
        let db = mock::connect(
            mock::postgres()
                .append_query_results([[chat_model("c1", "u1", "u2")]])
                .append_query_results([[user_model("u2", "bob")]])
                .append_query_results([[chat_message_model("m9", "c1", "u2", "¿seguís ahí?")]]),
        );

        let chats = service(db).list(&user_model("u1", "alice")).await.unwrap();

        assert_eq!(chats.len(), 1);
        let last = chats[0].last_message.as_ref().unwrap();
        assert_eq!(last.content, "¿seguís ahí?");
        assert_eq!(last.sender_username.as_deref(), Some("bob"));
    }
}
