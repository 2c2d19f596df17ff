//! Database entities.

#![allow(missing_docs)]

pub mod album;
pub mod album_like;
pub mod album_unlock;
pub mod blocking;
pub mod chat;
pub mod chat_message;
pub mod comment;
pub mod following;
pub mod notification;
pub mod photo;
pub mod photo_like;
pub mod photo_unlock;
pub mod report;
pub mod seller;
pub mod support_message;
pub mod user;

pub use album::Entity as Album;
pub use album_like::Entity as AlbumLike;
pub use album_unlock::Entity as AlbumUnlock;
pub use blocking::Entity as Blocking;
pub use chat::Entity as Chat;
pub use chat_message::Entity as ChatMessage;
pub use comment::Entity as Comment;
pub use following::Entity as Following;
pub use notification::Entity as Notification;
pub use photo::Entity as Photo;
pub use photo_like::Entity as PhotoLike;
pub use photo_unlock::Entity as PhotoUnlock;
pub use report::Entity as Report;
pub use seller::Entity as Seller;
pub use support_message::Entity as SupportMessage;
pub use user::Entity as User;
