//! Registration, login and password recovery.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use galeria_common::{AppError, AppResult, IdGenerator};
use galeria_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;

use crate::services::email::EmailService;

/// Lifetime of a password reset token.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 30;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub instagram: Option<String>,
}

/// Input for completing a password reset.
#[derive(Debug, Clone)]
pub struct ResetPasswordInput {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Account authentication service.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    email: EmailService,
    frontend_url: String,
    id_gen: IdGenerator,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, email: EmailService, frontend_url: String) -> Self {
        Self {
            user_repo,
            email,
            frontend_url,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an account.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        if input.password != input.confirm_password {
            return Err(AppError::BadRequest("Passwords do not match".to_string()));
        }

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Username is already taken".to_string()));
        }

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::BadRequest("Email is already in use".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username_lower: Set(input.username.to_lowercase()),
            username: Set(input.username),
            email: Set(input.email.to_lowercase()),
            password_hash: Set(password_hash),
            name: Set(input.name),
            photo: Set(None),
            description: Set(None),
            instagram: Set(input.instagram.filter(|i| !i.is_empty())),
            followers_count: Set(0),
            following_count: Set(0),
            seller_id: Set(None),
            mp_user_id: Set(None),
            reset_password_token: Set(None),
            reset_password_expires: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "Account created");
        Ok(user)
    }

    /// Check credentials. `identifier` is an email or a username.
    pub async fn login(&self, identifier: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_identifier(identifier)
            .await?
            .ok_or_else(|| AppError::BadRequest("User or email does not exist".to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::BadRequest("Incorrect password".to_string()));
        }

        Ok(user)
    }

    /// Resolve the user behind a session. Deleted accounts yield `None`.
    pub async fn session_user(&self, user_id: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_id(user_id).await
    }

    /// Issue a reset token and mail the reset link.
    pub async fn forgot_password(&self, email: &str) -> AppResult<()> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("No user with that email".to_string()))?;

        let token = self.id_gen.generate_reset_token();
        let expires = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        let recipient = user.email.clone();

        let mut active: user::ActiveModel = user.into();
        active.reset_password_token = Set(Some(token.clone()));
        active.reset_password_expires = Set(Some(expires.into()));
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;

        let link = format!(
            "{}/reset-password/{}",
            self.frontend_url.trim_end_matches('/'),
            token
        );
        self.email.send_password_reset(&recipient, &link).await
    }

    /// Set a new password from a reset token.
    pub async fn reset_password(&self, input: ResetPasswordInput) -> AppResult<()> {
        if input.new_password != input.confirm_password {
            return Err(AppError::BadRequest("Passwords do not match".to_string()));
        }
        if input.new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let user = self
            .user_repo
            .find_by_reset_token(&input.token)
            .await?
            .filter(|u| {
                u.reset_password_expires
                    .is_some_and(|expires| expires > Utc::now())
            })
            .ok_or_else(|| AppError::BadRequest("Invalid or expired token".to_string()))?;

        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(hash_password(&input.new_password)?);
        active.reset_password_token = Set(None);
        active.reset_password_expires = Set(None);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;

        Ok(())
    }
}

/// Hash a password using Argon2.
pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_fixtures::user_model;
    use galeria_db::test_utils::mock;
    use std::sync::Arc;

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> AuthService {
        AuthService::new(
            UserRepository::new(db),
            EmailService::disabled(),
            "http://localhost:5173".to_string(),
        )
    }

    fn register_input() -> RegisterInput {
        RegisterInput {
            name: "Alice".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            instagram: None,
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_rejects_mismatched_passwords() {
        let db = mock::connect(mock::postgres());
        let mut input = register_input();
        input.confirm_password = "other12".to_string();

        let err = service(db).register(input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username() {
        let db = mock::connect(
            mock::postgres().append_query_results([[user_model("u1", "alice")]]),
        );

        let err = service(db).register(register_input()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("Username")));
    }

    #[tokio::test]
    async fn test_register_creates_user() {
        let created = user_model("u1", "alice");
        let db = mock::connect(
            mock::postgres()
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[created]]),
        );

        let user = service(db).register(register_input()).await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let mut user = user_model("u1", "alice");
        user.password_hash = hash_password("correct-password").unwrap();
        let db = mock::connect(mock::postgres().append_query_results([[user]]));

        let err = service(db).login("alice", "wrong-password").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let db = mock::connect(
            mock::postgres().append_query_results([Vec::<user::Model>::new()]),
        );

        let err = service(db).login("nobody", "whatever").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email() {
        let db = mock::connect(
            mock::postgres().append_query_results([Vec::<user::Model>::new()]),
        );

        let err = service(db)
            .forgot_password("nobody@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reset_password_expired_token() {
        let mut user = user_model("u1", "alice");
        user.reset_password_token = Some("abc".to_string());
        user.reset_password_expires = Some((Utc::now() - Duration::minutes(1)).into());
        let db = mock::connect(mock::postgres().append_query_results([[user]]));

        let err = service(db)
            .reset_password(ResetPasswordInput {
                token: "abc".to_string(),
                new_password: "newpass".to_string(),
                confirm_password: "newpass".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("expired")));
    }

    #[tokio::test]
    async fn test_reset_password_short_password() {
        let db = mock::connect(mock::postgres());

        let err = service(db)
            .reset_password(ResetPasswordInput {
                token: "abc".to_string(),
                new_password: "123".to_string(),
                confirm_password: "123".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
