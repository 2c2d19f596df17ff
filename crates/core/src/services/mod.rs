//! Business logic services.

#![allow(missing_docs)]

pub mod access;
pub mod account;
pub mod album;
pub mod auth;
pub mod blocking;
pub mod chat;
pub mod comment;
pub mod email;
pub mod event_publisher;
pub mod feed;
pub mod following;
pub mod gateway;
pub mod like;
pub mod media;
pub mod notification;
pub mod payment;
pub mod photo;
pub mod report;
pub mod seller;
pub mod unlock;

pub use access::Viewer;
pub use account::{AccountService, ProfileView, UpdateProfileInput};
pub use album::{AlbumService, AlbumView, CreateAlbumInput};
pub use auth::{AuthService, RegisterInput, ResetPasswordInput};
pub use blocking::BlockingService;
pub use chat::{ChatDetail, ChatMessageView, ChatService, ChatSummary};
pub use comment::{CommentAuthor, CommentService, CommentView};
pub use email::EmailService;
pub use event_publisher::{EventPublisher, EventPublisherService, StreamEvent};
pub use feed::FeedService;
pub use following::{FollowingService, UserSummary};
pub use gateway::{MercadoPagoClient, PaymentGateway, PaymentGatewayService};
pub use like::{LikeService, LikeSummary};
pub use media::{ImageFormat, ProcessedImage};
pub use notification::{NotificationService, NotificationTarget, NotificationView};
pub use payment::{CreateOrderInput, PaymentService};
pub use photo::{PhotoService, PhotoView, UploadFile, UploadMeta};
pub use report::{CreateReportInput, ReportService, SupportRequestInput};
pub use seller::{SellerPreferenceInput, SellerService, currency_for_site};
pub use unlock::UnlockService;
