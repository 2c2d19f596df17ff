//! Model builders shared by the service tests.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use galeria_common::{LocalStorage, StorageBackend};
use galeria_db::entities::{
    album, blocking, chat, chat_message, comment, following,
    notification::{self, NotificationType},
    photo::{self, MediaType, PhotoCategory},
    photo_like, photo_unlock, seller, user,
};
use std::sync::Arc;

pub fn user_model(id: &str, username: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: username.to_string(),
        username_lower: username.to_lowercase(),
        email: format!("{}@example.com", username.to_lowercase()),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        name: username.to_string(),
        photo: None,
        description: None,
        instagram: None,
        followers_count: 0,
        following_count: 0,
        seller_id: None,
        mp_user_id: None,
        reset_password_token: None,
        reset_password_expires: None,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

/// A photo whose public URL is only set when `price` is zero.
pub fn photo_model(id: &str, user_id: &str, price: f64) -> photo::Model {
    let paid = price > 0.0;
    photo::Model {
        id: id.to_string(),
        user_id: user_id.to_string(),
        username: format!("user-{user_id}"),
        title: None,
        description: None,
        file_name: format!("{id}.jpg"),
        public_url: (!paid).then(|| format!("http://localhost:3000/files/public/{id}.jpg")),
        blur_url: paid.then(|| format!("http://localhost:3000/files/public/{id}_blur.jpg")),
        thumbnail_url: None,
        blurhash: None,
        responsive: serde_json::json!([]),
        is_paid_content: paid,
        category: PhotoCategory::Posts,
        album_id: None,
        likes_count: 0,
        price,
        currency: "ARS".to_string(),
        media_type: MediaType::Image,
        created_at: Utc::now().into(),
    }
}

pub fn album_model(id: &str, user_id: &str, price: f64) -> album::Model {
    album::Model {
        id: id.to_string(),
        user_id: user_id.to_string(),
        username: format!("user-{user_id}"),
        title: "Album".to_string(),
        description: None,
        price,
        currency: "ARS".to_string(),
        likes_count: 0,
        created_at: Utc::now().into(),
    }
}

pub fn notification_model(
    id: &str,
    recipient_id: &str,
    sender_id: &str,
    notification_type: NotificationType,
) -> notification::Model {
    notification::Model {
        id: id.to_string(),
        recipient_id: recipient_id.to_string(),
        sender_id: sender_id.to_string(),
        notification_type,
        media_type: None,
        reference_id: None,
        is_read: false,
        created_at: Utc::now().into(),
    }
}

pub fn following_model(follower_id: &str, followee_id: &str) -> following::Model {
    following::Model {
        id: format!("f-{follower_id}-{followee_id}"),
        follower_id: follower_id.to_string(),
        followee_id: followee_id.to_string(),
        created_at: Utc::now().into(),
    }
}

pub fn blocking_model(blocker_id: &str, blockee_id: &str) -> blocking::Model {
    blocking::Model {
        id: format!("b-{blocker_id}-{blockee_id}"),
        blocker_id: blocker_id.to_string(),
        blockee_id: blockee_id.to_string(),
        created_at: Utc::now().into(),
    }
}

pub fn photo_like_model(user_id: &str, photo_id: &str) -> photo_like::Model {
    photo_like::Model {
        id: format!("l-{user_id}-{photo_id}"),
        user_id: user_id.to_string(),
        photo_id: photo_id.to_string(),
        created_at: Utc::now().into(),
    }
}

pub fn photo_unlock_model(user_id: &str, photo_id: &str) -> photo_unlock::Model {
    photo_unlock::Model {
        id: format!("u-{user_id}-{photo_id}"),
        user_id: user_id.to_string(),
        photo_id: photo_id.to_string(),
        created_at: Utc::now().into(),
    }
}

pub fn comment_model(id: &str, user_id: &str, photo_id: &str, text: &str) -> comment::Model {
    comment::Model {
        id: id.to_string(),
        user_id: user_id.to_string(),
        photo_id: Some(photo_id.to_string()),
        album_id: None,
        text: text.to_string(),
        created_at: Utc::now().into(),
    }
}

pub fn seller_model(seller_id: &str, site_id: Option<&str>) -> seller::Model {
    seller::Model {
        id: format!("s-{seller_id}"),
        seller_id: seller_id.to_string(),
        access_token: "APP_USR-seller-token".to_string(),
        refresh_token: None,
        mp_user_id: "123456".to_string(),
        expires_in: Some(15_552_000),
        site_id: site_id.map(str::to_string),
        obtained_at: Utc::now().into(),
    }
}

pub fn chat_model(id: &str, a: &str, b: &str) -> chat::Model {
    let (participant_a, participant_b) = if a <= b { (a, b) } else { (b, a) };
    chat::Model {
        id: id.to_string(),
        participant_a: participant_a.to_string(),
        participant_b: participant_b.to_string(),
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
    }
}

pub fn chat_message_model(id: &str, chat_id: &str, sender_id: &str, content: &str) -> chat_message::Model {
    chat_message::Model {
        id: id.to_string(),
        chat_id: chat_id.to_string(),
        sender_id: sender_id.to_string(),
        content: content.to_string(),
        created_at: Utc::now().into(),
    }
}

/// Local storage rooted in a per-test temp directory.
pub fn test_storage(name: &str) -> Arc<dyn StorageBackend> {
    Arc::new(LocalStorage::new(
        std::env::temp_dir().join(format!("galeria-{name}")),
        "http://localhost:3000/files".to_string(),
        "test-secret".to_string(),
    ))
}

/// Every file stored under a `test_storage` directory, relative to its root.
pub fn stored_files(name: &str) -> Vec<String> {
    fn walk(dir: &std::path::Path, root: &std::path::Path, out: &mut Vec<String>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(&path, root, out);
            } else if let Ok(relative) = path.strip_prefix(root) {
                out.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }

    let root = std::env::temp_dir().join(format!("galeria-{name}"));
    let mut files = Vec::new();
    walk(&root, &root, &mut files);
    files
}
