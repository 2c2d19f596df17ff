//! Repository layer for database operations.

mod album;
mod blocking;
mod chat;
mod comment;
mod following;
mod like;
mod notification;
mod photo;
mod report;
mod seller;
mod unlock;
mod user;

pub use album::AlbumRepository;
pub use blocking::BlockingRepository;
pub use chat::{ChatRepository, ordered_pair};
pub use comment::CommentRepository;
pub use following::FollowingRepository;
pub use like::LikeRepository;
pub use notification::NotificationRepository;
pub use photo::PhotoRepository;
pub use report::ReportRepository;
pub use seller::SellerRepository;
pub use unlock::UnlockRepository;
pub use user::UserRepository;
