//! Event publisher service.
//!
//! Services push realtime events through this trait. The WebSocket hub in
//! the API crate provides the implementation.

use async_trait::async_trait;
use galeria_common::AppResult;
use serde::Serialize;
use std::sync::Arc;

use crate::services::chat::ChatMessageView;
use crate::services::notification::NotificationView;

/// Event types for real-time updates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "body", rename_all = "camelCase")]
pub enum StreamEvent {
    /// A notification for the recipient's username room.
    Notification(NotificationView),
    /// A chat message for everyone in the chat room.
    ReceiveMessage(ChatMessageView),
    /// A chat message for the recipient's username room.
    NewMessage(ChatMessageView),
}

/// Trait for publishing real-time events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a notification to the recipient's room.
    async fn publish_notification(
        &self,
        recipient_username: &str,
        notification: &NotificationView,
    ) -> AppResult<()>;

    /// Publish a chat message to the chat room and to the recipient's room.
    async fn publish_chat_message(
        &self,
        chat_id: &str,
        recipient_username: &str,
        message: &ChatMessageView,
    ) -> AppResult<()>;
}

/// Wrapper for boxed EventPublisher trait object.
pub type EventPublisherService = Arc<dyn EventPublisher>;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Publisher that records what it was asked to send.
    #[derive(Default)]
    pub struct RecordingPublisher {
        pub events: Mutex<Vec<(String, StreamEvent)>>,
    }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish_notification(
            &self,
            recipient_username: &str,
            notification: &NotificationView,
        ) -> AppResult<()> {
            if let Ok(mut events) = self.events.lock() {
                events.push((
                    recipient_username.to_string(),
                    StreamEvent::Notification(notification.clone()),
                ));
            }
            Ok(())
        }

        async fn publish_chat_message(
            &self,
            chat_id: &str,
            recipient_username: &str,
            message: &ChatMessageView,
        ) -> AppResult<()> {
            if let Ok(mut events) = self.events.lock() {
                events.push((chat_id.to_string(), StreamEvent::ReceiveMessage(message.clone())));
                events.push((
                    recipient_username.to_string(),
                    StreamEvent::NewMessage(message.clone()),
                ));
            }
            Ok(())
        }
    }
}
