//! Mercado Pago client.

use async_trait::async_trait;
use galeria_common::{AppError, AppResult, config::PaymentsConfig};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;

/// One line of a checkout preference.
#[derive(Debug, Clone, Serialize)]
pub struct PreferenceItem {
    pub title: String,
    pub quantity: u32,
    pub unit_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_id: Option<String>,
}

/// Where the buyer lands after checkout.
#[derive(Debug, Clone, Serialize)]
pub struct BackUrls {
    pub success: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<String>,
    pub failure: String,
}

/// Checkout preference sent to the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct Preference {
    pub items: Vec<PreferenceItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PaymentMetadata>,
    pub marketplace_fee: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_url: Option<String>,
    pub back_urls: BackUrls,
}

/// Metadata attached to a preference and echoed back on the payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
}

/// Payment as reported by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    pub status: String,
    /// Amount the buyer paid, fees included.
    #[serde(default)]
    pub transaction_amount: Option<f64>,
    #[serde(default)]
    pub metadata: Option<PaymentMetadata>,
}

impl Payment {
    /// Whether the payment went through.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == "approved"
    }
}

/// Tokens returned by the OAuth code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Gateway account id, numeric on the wire.
    #[serde(deserialize_with = "id_as_string")]
    pub user_id: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("unexpected id {other}"))),
    }
}

/// Operations the platform needs from the payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// URL the seller is sent to for linking their account.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an OAuth authorization code.
    async fn exchange_code(&self, code: &str) -> AppResult<OAuthToken>;

    /// Marketplace site of a linked account.
    async fn site_id(&self, account_id: &str, access_token: &str) -> AppResult<Option<String>>;

    /// Create a checkout preference on behalf of a seller. Returns the raw gateway body.
    async fn create_preference(
        &self,
        access_token: &str,
        preference: &Preference,
    ) -> AppResult<serde_json::Value>;

    /// Look up a payment with the platform credentials.
    async fn payment(&self, payment_id: &str) -> AppResult<Payment>;
}

/// Shared gateway handle.
pub type PaymentGatewayService = Arc<dyn PaymentGateway>;

/// HTTP client for the Mercado Pago REST API.
#[derive(Clone)]
pub struct MercadoPagoClient {
    http_client: reqwest::Client,
    config: PaymentsConfig,
}

impl MercadoPagoClient {
    /// Create a new client.
    pub fn new(config: PaymentsConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> AppResult<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Mercado Pago {what} failed: {status} - {body}"
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse Mercado Pago {what} response: {e}"))
        })
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoClient {
    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}/authorization?client_id={}&response_type=code&platform_id=mp&state={}&redirect_uri={}",
            self.config.auth_base.trim_end_matches('/'),
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(state),
            urlencoding::encode(&self.config.redirect_uri),
        )
    }

    async fn exchange_code(&self, code: &str) -> AppResult<OAuthToken> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .http_client
            .post(self.api_url("/oauth/token"))
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("OAuth request failed: {e}")))?;

        Self::read_json(response, "token exchange").await
    }

    async fn site_id(&self, account_id: &str, access_token: &str) -> AppResult<Option<String>> {
        #[derive(Deserialize)]
        struct Account {
            site_id: Option<String>,
        }

        let response = self
            .http_client
            .get(self.api_url(&format!("/users/{account_id}")))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Account request failed: {e}")))?;

        let account: Account = Self::read_json(response, "account lookup").await?;
        Ok(account.site_id)
    }

    async fn create_preference(
        &self,
        access_token: &str,
        preference: &Preference,
    ) -> AppResult<serde_json::Value> {
        let response = self
            .http_client
            .post(self.api_url("/checkout/preferences"))
            .bearer_auth(access_token)
            .json(preference)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Preference request failed: {e}")))?;

        Self::read_json(response, "preference").await
    }

    async fn payment(&self, payment_id: &str) -> AppResult<Payment> {
        let response = self
            .http_client
            .get(self.api_url(&format!(
                "/v1/payments/{}",
                urlencoding::encode(payment_id)
            )))
            .bearer_auth(&self.config.platform_access_token)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Payment request failed: {e}")))?;

        Self::read_json(response, "payment lookup").await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Gateway double with canned answers.
    #[derive(Default)]
    pub struct FakeGateway {
        pub payment: Option<Payment>,
        pub site_id: Option<String>,
        pub preferences: Mutex<Vec<(String, serde_json::Value)>>,
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        fn authorization_url(&self, state: &str) -> String {
            format!("https://auth.example/authorization?state={state}")
        }

        async fn exchange_code(&self, code: &str) -> AppResult<OAuthToken> {
            Ok(OAuthToken {
                access_token: format!("token-{code}"),
                refresh_token: Some("refresh".to_string()),
                user_id: "987".to_string(),
                expires_in: Some(3600),
            })
        }

        async fn site_id(&self, _account_id: &str, _access_token: &str) -> AppResult<Option<String>> {
            Ok(self.site_id.clone())
        }

        async fn create_preference(
            &self,
            access_token: &str,
            preference: &Preference,
        ) -> AppResult<serde_json::Value> {
            let body = serde_json::to_value(preference).unwrap();
            self.preferences
                .lock()
                .unwrap()
                .push((access_token.to_string(), body));
            Ok(serde_json::json!({ "id": "pref-1", "init_point": "https://pay.example/pref-1" }))
        }

        async fn payment(&self, _payment_id: &str) -> AppResult<Payment> {
            self.payment
                .clone()
                .ok_or_else(|| AppError::ExternalService("no payment".to_string()))
        }
    }

    #[test]
    fn test_oauth_token_accepts_numeric_user_id() {
        let token: OAuthToken = serde_json::from_value(serde_json::json!({
            "access_token": "APP_USR-1",
            "user_id": 123456789,
            "expires_in": 15552000
        }))
        .unwrap();

        assert_eq!(token.user_id, "123456789");
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn test_authorization_url_encodes_redirect() {
        let client = MercadoPagoClient::new(PaymentsConfig {
            client_id: "abc".to_string(),
            redirect_uri: "https://api.example.com/api/mp/callback".to_string(),
            ..PaymentsConfig::default()
        })
        .unwrap();

        let url = client.authorization_url("alice");
        assert!(url.starts_with("https://auth.mercadopago.com/authorization?client_id=abc"));
        assert!(url.contains("state=alice"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapi.example.com%2Fapi%2Fmp%2Fcallback"));
    }

    #[test]
    fn test_payment_metadata_round_trip_skips_empty_fields() {
        let metadata = PaymentMetadata {
            photo_id: Some("p1".to_string()),
            user_id: Some("u1".to_string()),
            ..PaymentMetadata::default()
        };

        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value, serde_json::json!({ "photo_id": "p1", "user_id": "u1" }));
    }
}
