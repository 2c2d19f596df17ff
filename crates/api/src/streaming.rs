//! WebSocket streaming API.
//!
//! Every connection subscribes to one broadcast channel of room-addressed
//! events and forwards the ones whose room it has joined. A signed-in
//! connection joins its own user room on connect; chat rooms are joined on
//! request after a participant check.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{Sink, SinkExt, StreamExt};
use galeria_common::AppResult;
use galeria_core::{ChatMessageView, EventPublisher, NotificationView, StreamEvent};
use galeria_db::entities::user;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::{extractors::MaybeAuthUser, middleware::AppState};

/// Buffered events per subscriber before it starts lagging.
const CHANNEL_CAPACITY: usize = 1024;

/// Room for everything addressed to one user.
#[must_use]
pub fn user_room(username: &str) -> String {
    format!("user:{}", username.to_lowercase())
}

/// Room for the members of one chat.
#[must_use]
pub fn chat_room(chat_id: &str) -> String {
    format!("chat:{chat_id}")
}

/// An event addressed to a room.
#[derive(Debug, Clone)]
pub struct RoomEvent {
    pub room: String,
    pub event: StreamEvent,
}

/// Fan-out hub shared by all connections.
#[derive(Clone)]
pub struct StreamingHub {
    tx: Arc<broadcast::Sender<RoomEvent>>,
}

impl StreamingHub {
    /// Create a new hub.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx: Arc::new(tx) }
    }

    /// Send an event to a room. Returns how many connections received it.
    pub fn publish(&self, room: String, event: StreamEvent) -> usize {
        // No subscribers is not an error
        self.tx.send(RoomEvent { room, event }).unwrap_or(0)
    }

    /// Subscribe to every room event.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.tx.subscribe()
    }
}

impl Default for StreamingHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for StreamingHub {
    async fn publish_notification(
        &self,
        recipient_username: &str,
        notification: &NotificationView,
    ) -> AppResult<()> {
        self.publish(
            user_room(recipient_username),
            StreamEvent::Notification(notification.clone()),
        );
        Ok(())
    }

    async fn publish_chat_message(
        &self,
        chat_id: &str,
        recipient_username: &str,
        message: &ChatMessageView,
    ) -> AppResult<()> {
        self.publish(chat_room(chat_id), StreamEvent::ReceiveMessage(message.clone()));
        self.publish(
            user_room(recipient_username),
            StreamEvent::NewMessage(message.clone()),
        );
        Ok(())
    }
}

/// Client-to-server message.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Start receiving a chat's messages.
    JoinChat {
        #[serde(rename = "chatId")]
        chat_id: String,
    },
    /// Stop receiving a chat's messages.
    LeaveChat {
        #[serde(rename = "chatId")]
        chat_id: String,
    },
    /// Send a chat message.
    SendMessage {
        #[serde(rename = "chatId")]
        chat_id: String,
        content: String,
    },
    /// Keepalive.
    Ping,
}

/// Server-to-client replies that are not room events.
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "body", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Chat room joined.
    Joined {
        #[serde(rename = "chatId")]
        chat_id: String,
    },
    /// Keepalive reply.
    Pong,
    /// Rejected client message.
    Error { message: String },
}

/// WebSocket handler for streaming.
pub async fn streaming_handler(
    ws: WebSocketUpgrade,
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, user, state))
}

/// Handle a WebSocket connection.
async fn handle_socket(socket: WebSocket, user: Option<user::Model>, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.streaming.subscribe();

    let mut rooms: HashSet<String> = HashSet::new();
    if let Some(ref user) = user {
        rooms.insert(user_room(&user.username));
    }

    info!(user_id = ?user.as_ref().map(|u| &u.id), "Streaming connection established");

    loop {
        tokio::select! {
            msg = receiver.next() => {
                let Some(msg) = msg else { break };
                match msg {
                    Ok(Message::Text(text)) => {
                        let reply = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                handle_client_message(client_msg, user.as_ref(), &mut rooms, &state).await
                            }
                            Err(e) => {
                                debug!(error = %e, "Failed to parse client message");
                                Some(ServerMessage::Error {
                                    message: "Invalid message".to_string(),
                                })
                            }
                        };
                        if let Some(reply) = reply {
                            if !send_json(&mut sender, &reply).await {
                                break;
                            }
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(Message::Ping(data)) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                }
            }

            event = events.recv() => {
                match event {
                    Ok(RoomEvent { room, event }) => {
                        if rooms.contains(&room) && !send_json(&mut sender, &event).await {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Streaming connection lagged; events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    info!("Streaming connection closed");
}

async fn send_json<S, T>(sender: &mut S, value: &T) -> bool
where
    S: Sink<Message> + Unpin,
    T: Serialize,
{
    match serde_json::to_string(value) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to serialize streaming message");
            true
        }
    }
}

/// Handle a client message.
async fn handle_client_message(
    msg: ClientMessage,
    user: Option<&user::Model>,
    rooms: &mut HashSet<String>,
    state: &AppState,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::Ping => Some(ServerMessage::Pong),
        ClientMessage::LeaveChat { chat_id } => {
            rooms.remove(&chat_room(&chat_id));
            None
        }
        ClientMessage::JoinChat { chat_id } => {
            let Some(user) = user else {
                return Some(unauthorized());
            };
            match state.chat_service.is_participant(&user.id, &chat_id).await {
                Ok(true) => {
                    rooms.insert(chat_room(&chat_id));
                    Some(ServerMessage::Joined { chat_id })
                }
                Ok(false) => Some(ServerMessage::Error {
                    message: "Chat not found".to_string(),
                }),
                Err(e) => Some(ServerMessage::Error {
                    message: e.to_string(),
                }),
            }
        }
        ClientMessage::SendMessage { chat_id, content } => {
            let Some(user) = user else {
                return Some(unauthorized());
            };
            // Fan-out happens through the hub
            match state.chat_service.send_message(user, &chat_id, &content).await {
                Ok(_) => None,
                Err(e) => Some(ServerMessage::Error {
                    message: e.to_string(),
                }),
            }
        }
    }
}

fn unauthorized() -> ServerMessage {
    ServerMessage::Error {
        message: "Unauthorized".to_string(),
    }
}
