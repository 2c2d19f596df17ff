//! Linking user accounts to Mercado Pago seller accounts.

use chrono::Utc;
use galeria_common::{AppError, AppResult, IdGenerator};
use galeria_db::{
    entities::{seller, user},
    repositories::{SellerRepository, UserRepository},
};
use sea_orm::Set;

use crate::services::gateway::{BackUrls, PaymentGatewayService, Preference, PreferenceItem};

/// Currency used by a seller's site. Unknown sites fall back to ARS.
#[must_use]
pub fn currency_for_site(site_id: Option<&str>) -> &'static str {
    match site_id {
        Some("MLB") => "BRL",
        Some("MLC") => "CLP",
        Some("MCO") => "COP",
        Some("MLM") => "MXN",
        Some("MPE") => "PEN",
        Some("MLU") => "UYU",
        _ => "ARS",
    }
}

/// Input for a direct seller preference.
#[derive(Debug, Clone)]
pub struct SellerPreferenceInput {
    pub title: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub marketplace_fee: Option<f64>,
}

/// Seller service for business logic.
#[derive(Clone)]
pub struct SellerService {
    seller_repo: SellerRepository,
    user_repo: UserRepository,
    gateway: PaymentGatewayService,
    frontend_url: String,
    server_url: String,
    marketplace_fee: f64,
    id_gen: IdGenerator,
}

impl SellerService {
    /// Create a new seller service.
    #[must_use]
    pub fn new(
        seller_repo: SellerRepository,
        user_repo: UserRepository,
        gateway: PaymentGatewayService,
        frontend_url: &str,
        server_url: &str,
        marketplace_fee: f64,
    ) -> Self {
        Self {
            seller_repo,
            user_repo,
            gateway,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
            server_url: server_url.trim_end_matches('/').to_string(),
            marketplace_fee,
            id_gen: IdGenerator::new(),
        }
    }

    /// Authorization page the seller is sent to. The seller id travels as `state`.
    #[must_use]
    pub fn connect_url(&self, seller_id: &str) -> String {
        self.gateway.authorization_url(seller_id)
    }

    /// Complete the OAuth flow and return where the browser goes next.
    pub async fn handle_callback(
        &self,
        code: Option<&str>,
        state: Option<&str>,
    ) -> AppResult<String> {
        let (Some(code), Some(seller_id)) = (
            code.filter(|c| !c.is_empty()),
            state.filter(|s| !s.is_empty()),
        ) else {
            return Err(AppError::BadRequest(
                "Missing 'code' or 'state' in the redirect".to_string(),
            ));
        };

        let user = self.user_repo.get_by_username(seller_id).await?;

        let token = self.gateway.exchange_code(code).await?;
        let site_id = self
            .gateway
            .site_id(&token.user_id, &token.access_token)
            .await?
            .ok_or_else(|| {
                AppError::ExternalService("Could not resolve the seller's site".to_string())
            })?;

        self.seller_repo
            .upsert(seller::ActiveModel {
                id: Set(self.id_gen.generate()),
                seller_id: Set(seller_id.to_string()),
                access_token: Set(token.access_token),
                refresh_token: Set(token.refresh_token),
                mp_user_id: Set(token.user_id.clone()),
                expires_in: Set(token.expires_in),
                site_id: Set(Some(site_id.clone())),
                obtained_at: Set(Utc::now().into()),
            })
            .await?;

        let mut active: user::ActiveModel = user.into();
        active.seller_id = Set(Some(seller_id.to_string()));
        active.mp_user_id = Set(Some(token.user_id));
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;

        tracing::info!(seller_id = %seller_id, site_id = %site_id, "Seller account linked");
        Ok(format!("{}/{seller_id}?mpLinked=1", self.frontend_url))
    }

    /// Create a checkout preference on behalf of a linked seller.
    pub async fn create_preference(
        &self,
        seller_id: &str,
        input: SellerPreferenceInput,
    ) -> AppResult<serde_json::Value> {
        let seller = self
            .seller_repo
            .find_by_seller_id(seller_id)
            .await?
            .filter(|s| !s.access_token.is_empty())
            .ok_or_else(|| {
                AppError::BadRequest("This seller is not connected through OAuth".to_string())
            })?;

        let preference = Preference {
            items: vec![PreferenceItem {
                title: input.title,
                quantity: input.quantity,
                unit_price: input.unit_price,
                currency_id: Some(currency_for_site(seller.site_id.as_deref()).to_string()),
            }],
            metadata: None,
            marketplace_fee: input.marketplace_fee.unwrap_or(self.marketplace_fee),
            notification_url: None,
            back_urls: BackUrls {
                success: format!("{}/api/mp/success", self.server_url),
                pending: None,
                failure: format!("{}/api/mp/failure", self.server_url),
            },
        };

        self.gateway
            .create_preference(&seller.access_token, &preference)
            .await
    }

    /// Whether the user has a linked seller account.
    pub async fn is_linked(&self, user: &user::Model) -> AppResult<bool> {
        Ok(self
            .seller_repo
            .find_by_seller_id(&user.username)
            .await?
            .is_some())
    }

    /// Currency of the user's linked seller account.
    pub async fn currency(&self, user: &user::Model) -> AppResult<&'static str> {
        let seller = self
            .seller_repo
            .find_by_seller_id(&user.username)
            .await?
            .ok_or_else(|| AppError::NotFound("Seller account not linked".to_string()))?;

        let site_id = seller
            .site_id
            .ok_or_else(|| AppError::NotFound("Seller site is unknown".to_string()))?;
        Ok(currency_for_site(Some(&site_id)))
    }
}
