//! Paid-content checkout and payment notifications.

use galeria_common::{AppError, AppResult};
use galeria_db::{
    entities::user,
    repositories::{AlbumRepository, PhotoRepository, SellerRepository, UserRepository},
};

use crate::services::access;
use crate::services::gateway::{
    BackUrls, PaymentGatewayService, PaymentMetadata, Preference, PreferenceItem,
};
use crate::services::unlock::UnlockService;

/// Input for creating a checkout order. The price is always the stored one.
#[derive(Debug, Clone, Default)]
pub struct CreateOrderInput {
    pub photo_id: Option<String>,
    pub album_id: Option<String>,
    pub title: String,
}

/// What a checkout is for, as quoted from the store.
struct Quote {
    seller_username: String,
    price: f64,
    currency: String,
    metadata: PaymentMetadata,
}

/// Gateway payment ids are numeric.
fn is_valid_payment_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Amounts are compared to the cent.
fn covers_price(paid: f64, price: f64) -> bool {
    (paid * 100.0).round() >= (price * 100.0).round()
}

/// Payment service for business logic.
#[derive(Clone)]
pub struct PaymentService {
    photo_repo: PhotoRepository,
    album_repo: AlbumRepository,
    user_repo: UserRepository,
    seller_repo: SellerRepository,
    unlock: UnlockService,
    gateway: PaymentGatewayService,
    server_url: String,
    marketplace_fee: f64,
}

impl PaymentService {
    /// Create a new payment service.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        photo_repo: PhotoRepository,
        album_repo: AlbumRepository,
        user_repo: UserRepository,
        seller_repo: SellerRepository,
        unlock: UnlockService,
        gateway: PaymentGatewayService,
        server_url: &str,
        marketplace_fee: f64,
    ) -> Self {
        Self {
            photo_repo,
            album_repo,
            user_repo,
            seller_repo,
            unlock,
            gateway,
            server_url: server_url.trim_end_matches('/').to_string(),
            marketplace_fee,
        }
    }

    /// Create a checkout preference for a photo or an album, paid to its owner.
    pub async fn create_order(
        &self,
        buyer: &user::Model,
        input: CreateOrderInput,
    ) -> AppResult<serde_json::Value> {
        let quote = match (&input.photo_id, &input.album_id) {
            (Some(photo_id), None) => {
                let photo = self.photo_repo.get_by_id(photo_id).await?;
                Quote {
                    seller_username: photo.username,
                    price: photo.price,
                    currency: photo.currency,
                    metadata: PaymentMetadata {
                        photo_id: Some(photo.id),
                        ..PaymentMetadata::default()
                    },
                }
            }
            (_, Some(album_id)) => {
                let album = self.album_repo.get_by_id(album_id).await?;
                if self.photo_repo.find_by_album(&album.id).await?.is_empty() {
                    return Err(AppError::BadRequest("Album has no photos".to_string()));
                }
                Quote {
                    seller_username: album.username,
                    price: album.price,
                    currency: album.currency,
                    metadata: PaymentMetadata {
                        album_id: Some(album.id),
                        ..PaymentMetadata::default()
                    },
                }
            }
            (None, None) => {
                return Err(AppError::BadRequest(
                    "photoId or albumId is required".to_string(),
                ));
            }
        };

        if access::is_free(quote.price) {
            return Err(AppError::BadRequest(
                "This content is free and needs no purchase".to_string(),
            ));
        }
        let Quote {
            seller_username,
            price,
            currency,
            metadata,
        } = quote;

        let seller = self
            .seller_repo
            .find_by_seller_id(&seller_username)
            .await?
            .filter(|s| !s.access_token.is_empty())
            .ok_or_else(|| {
                AppError::BadRequest("Seller is not linked to Mercado Pago".to_string())
            })?;

        let back_url = |outcome: &str| {
            format!(
                "{}/api/payment/{outcome}?seller={}",
                self.server_url,
                urlencoding::encode(&seller_username)
            )
        };

        let preference = Preference {
            items: vec![PreferenceItem {
                title: input.title,
                quantity: 1,
                unit_price: price,
                currency_id: Some(currency),
            }],
            metadata: Some(PaymentMetadata {
                user_id: Some(buyer.id.clone()),
                seller: Some(seller_username.clone()),
                ..metadata
            }),
            marketplace_fee: self.marketplace_fee,
            notification_url: Some(format!("{}/api/payment/webhook", self.server_url)),
            back_urls: BackUrls {
                success: back_url("success"),
                pending: Some(back_url("pending")),
                failure: back_url("failure"),
            },
        };

        let created = self
            .gateway
            .create_preference(&seller.access_token, &preference)
            .await?;

        tracing::info!(buyer = %buyer.id, seller = %seller_username, price, "Checkout preference created");
        Ok(created)
    }

    /// Process a gateway notification. Approved payments unlock their content.
    pub async fn handle_webhook(&self, topic: Option<&str>, id: Option<&str>) -> AppResult<()> {
        let (Some(topic), Some(id)) = (topic, id) else {
            return Err(AppError::BadRequest("Invalid notification".to_string()));
        };

        if topic != "payment" {
            tracing::debug!(topic = %topic, "Ignoring unhandled notification topic");
            return Err(AppError::BadRequest(format!("Unhandled event: {topic}")));
        }

        if !is_valid_payment_id(id) {
            return Err(AppError::BadRequest("Invalid payment id".to_string()));
        }

        let payment = self.gateway.payment(id).await?;
        if !payment.is_approved() {
            tracing::debug!(payment_id = %id, status = %payment.status, "Payment not approved");
            return Ok(());
        }

        let metadata = payment.metadata.unwrap_or_default();
        let user_id = metadata
            .user_id
            .ok_or_else(|| AppError::BadRequest("Payment metadata is missing user_id".to_string()))?;
        let buyer = self.user_repo.get_by_id(&user_id).await?;
        let paid = payment.transaction_amount.unwrap_or(0.0);

        if let Some(photo_id) = metadata.photo_id {
            let photo = self.photo_repo.get_by_id(&photo_id).await?;
            if !covers_price(paid, photo.price) {
                tracing::warn!(payment_id = %id, photo_id = %photo.id, paid, price = photo.price, "Payment does not cover the price");
                return Ok(());
            }
            self.unlock.unlock_photo(&buyer.id, &photo).await?;
        } else if let Some(album_id) = metadata.album_id {
            let album = self.album_repo.get_by_id(&album_id).await?;
            if !covers_price(paid, album.price) {
                tracing::warn!(payment_id = %id, album_id = %album.id, paid, price = album.price, "Payment does not cover the price");
                return Ok(());
            }
            self.unlock.unlock_album(&buyer.id, &album).await?;
        }

        Ok(())
    }
}
