//! Notification service.

use crate::services::event_publisher::EventPublisherService;
use chrono::{DateTime, FixedOffset, Utc};
use galeria_common::{AppResult, IdGenerator};
use galeria_db::{
    entities::{
        notification::{self, NotificationType},
        photo::MediaType,
        user,
    },
    repositories::{NotificationRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;
use std::collections::HashMap;

/// Avatar reported for senders without a profile photo.
pub const DEFAULT_SENDER_PHOTO: &str = "/default-profile.png";

/// Maximum number of notifications returned in one listing.
const LIST_LIMIT: u64 = 100;

/// Notification as shown to its recipient.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: String,
    pub recipient: String,
    pub sender: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<FixedOffset>,
    pub sender_username: Option<String>,
    pub sender_photo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl NotificationView {
    fn new(model: notification::Model, sender: Option<&user::Model>) -> Self {
        Self {
            id: model.id,
            recipient: model.recipient_id,
            sender: model.sender_id,
            notification_type: model.notification_type,
            media_type: model.media_type,
            reference_id: model.reference_id,
            is_read: model.is_read,
            created_at: model.created_at,
            sender_username: sender.map(|s| s.username.clone()),
            sender_photo: sender
                .and_then(|s| s.photo.clone())
                .unwrap_or_else(|| DEFAULT_SENDER_PHOTO.to_string()),
            photo_url: None,
        }
    }
}

/// What a notification refers to.
#[derive(Debug, Clone, Default)]
pub struct NotificationTarget {
    /// Photo, album or user the notification points at.
    pub reference_id: Option<String>,
    /// Media type of the referenced photo.
    pub media_type: Option<MediaType>,
    /// Preview URL pushed along with like and comment notifications.
    pub photo_url: Option<String>,
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    event_publisher: Option<EventPublisherService>,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository, user_repo: UserRepository) -> Self {
        Self {
            notification_repo,
            user_repo,
            event_publisher: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    /// Store a notification and push it to the recipient.
    ///
    /// Returns `None` when sender and recipient are the same user.
    pub async fn notify(
        &self,
        recipient: &user::Model,
        sender: &user::Model,
        notification_type: NotificationType,
        target: NotificationTarget,
    ) -> AppResult<Option<notification::Model>> {
        if recipient.id == sender.id {
            return Ok(None);
        }

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient.id.clone()),
            sender_id: Set(sender.id.clone()),
            notification_type: Set(notification_type),
            media_type: Set(target.media_type),
            reference_id: Set(target.reference_id),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        };

        let created = self.notification_repo.create(model).await?;

        if let Some(ref publisher) = self.event_publisher {
            let mut view = NotificationView::new(created.clone(), Some(sender));
            view.photo_url = target.photo_url;
            if let Err(e) = publisher
                .publish_notification(&recipient.username, &view)
                .await
            {
                tracing::warn!(error = %e, recipient = %recipient.username, "Failed to publish notification");
            }
        }

        Ok(Some(created))
    }

    /// Notifications of a user, newest first.
    pub async fn list(&self, recipient_id: &str) -> AppResult<Vec<NotificationView>> {
        let notifications = self
            .notification_repo
            .find_by_recipient(recipient_id, LIST_LIMIT, None)
            .await?;

        let mut sender_ids: Vec<String> =
            notifications.iter().map(|n| n.sender_id.clone()).collect();
        sender_ids.sort();
        sender_ids.dedup();

        let senders: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&sender_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(notifications
            .into_iter()
            .map(|n| {
                let sender = senders.get(&n.sender_id);
                NotificationView::new(n, sender)
            })
            .collect())
    }

    /// Mark every notification of a user as read.
    pub async fn mark_all_as_read(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(recipient_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::event_publisher::{StreamEvent, tests::RecordingPublisher};
    use crate::test_fixtures::{notification_model, user_model};
    use galeria_db::test_utils::mock;
    use std::sync::Arc;

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> NotificationService {
        NotificationService::new(
            NotificationRepository::new(db.clone()),
            UserRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_notify_self_is_skipped() {
        let db = mock::connect(mock::postgres());
        let service = service(db);
        let alice = user_model("u1", "alice");

        let result = service
            .notify(&alice, &alice, NotificationType::Follow, NotificationTarget::default())
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_notify_publishes_to_recipient_room() {
        let stored = notification_model("n1", "u2", "u1", NotificationType::Like);
        let db = mock::connect(mock::postgres().append_query_results([[stored]]));

        let publisher = Arc::new(RecordingPublisher::default());
        let mut service = service(db);
        service.set_event_publisher(publisher.clone());

        let alice = user_model("u1", "alice");
        let bob = user_model("u2", "bob");
        let target = NotificationTarget {
            reference_id: Some("p1".to_string()),
            media_type: Some(MediaType::Image),
            photo_url: Some("http://cdn/p1.jpg".to_string()),
        };

        let created = service
            .notify(&bob, &alice, NotificationType::Like, target)
            .await
            .unwrap();
        assert!(created.is_some());

        let events = publisher.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "bob");
        match &events[0].1 {
            StreamEvent::Notification(view) => {
                assert_eq!(view.sender_username.as_deref(), Some("alice"));
                assert_eq!(view.sender_photo, DEFAULT_SENDER_PHOTO);
                assert_eq!(view.photo_url.as_deref(), Some("http://cdn/p1.jpg"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_fills_sender_defaults() {
        let n1 = notification_model("n2", "u2", "u1", NotificationType::Follow);
        let n2 = notification_model("n1", "u2", "gone", NotificationType::Comment);
        let mut alice = user_model("u1", "alice");
        alice.photo = Some("/avatars/alice.jpg".to_string());

        let db = mock::connect(
            mock::postgres()
                .append_query_results([[n1, n2]])
                .append_query_results([[alice]]),
        );

        let list = service(db).list("u2").await.unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].sender_photo, "/avatars/alice.jpg");
        assert_eq!(list[1].sender_username, None);
        assert_eq!(list[1].sender_photo, DEFAULT_SENDER_PHOTO);
    }
}
