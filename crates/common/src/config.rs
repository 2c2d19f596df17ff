//! Application configuration.

use serde::Deserialize;
use std::path::Path;

use crate::storage::StorageConfig;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Session and cookie configuration.
    pub auth: AuthConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Payment gateway configuration.
    #[serde(default)]
    pub payments: PaymentsConfig,
    /// Outgoing mail configuration. Reset links are only logged when absent.
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of the API, used for webhook and redirect URLs.
    pub url: String,
    /// Public URL of the web client.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    /// Origins allowed to make credentialed cross-origin requests.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for session tokens.
    pub jwt_secret: String,
    /// Session lifetime in hours.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    /// Mark the session cookie `Secure` and `SameSite=None`.
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
}

/// Mercado Pago configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentsConfig {
    /// OAuth application id.
    #[serde(default)]
    pub client_id: String,
    /// OAuth application secret.
    #[serde(default)]
    pub client_secret: String,
    /// OAuth redirect URI registered with the gateway.
    #[serde(default)]
    pub redirect_uri: String,
    /// Marketplace access token used to look up payments from webhooks.
    #[serde(default)]
    pub platform_access_token: String,
    /// REST API base URL.
    #[serde(default = "default_mp_api_base")]
    pub api_base: String,
    /// Authorization page base URL.
    #[serde(default = "default_mp_auth_base")]
    pub auth_base: String,
    /// Marketplace fee charged on each preference.
    #[serde(default)]
    pub marketplace_fee: f64,
    /// Let `PUT /api/albums/{id}/unlock` grant albums without a payment. Development only.
    #[serde(default)]
    pub simulate_purchases: bool,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            platform_access_token: String::new(),
            api_base: default_mp_api_base(),
            auth_base: default_mp_auth_base(),
            marketplace_fee: 0.0,
            simulate_purchases: false,
        }
    }
}

/// SMTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host.
    pub smtp_host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: Option<String>,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,
    /// Sender address.
    pub from_address: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn default_frontend_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost".to_string(),
    ]
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_token_ttl_hours() -> i64 {
    24
}

const fn default_true() -> bool {
    true
}

fn default_mp_api_base() -> String {
    "https://api.mercadopago.com".to_string()
}

fn default_mp_auth_base() -> String {
    "https://auth.mercadopago.com".to_string()
}

const fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "Galeria".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `GALERIA_ENV`)
    /// 3. Environment variables with `GALERIA__` prefix, after loading `.env`
    pub fn load() -> Result<Self, config::ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "Failed to read .env file");
            }
        }

        let env = std::env::var("GALERIA_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("GALERIA")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("GALERIA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
