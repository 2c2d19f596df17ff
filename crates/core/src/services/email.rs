//! Outgoing email.

use galeria_common::{AppError, AppResult, config::EmailConfig};
use lettre::message::{Mailbox, Message, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::sync::Arc;

/// SMTP mailer. Without SMTP settings messages are logged instead of sent.
#[derive(Clone)]
pub struct EmailService {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Option<Mailbox>,
}

impl EmailService {
    /// Build the mailer from configuration.
    pub fn new(config: Option<&EmailConfig>) -> AppResult<Self> {
        let Some(config) = config.filter(|c| !c.smtp_host.trim().is_empty()) else {
            tracing::warn!("SMTP not configured; emails will be logged only");
            return Ok(Self::disabled());
        };

        let from = format!("{} <{}>", config.from_name, config.from_address)
            .parse::<Mailbox>()
            .map_err(|e| AppError::Config(format!("Invalid from address: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::Config(format!("Failed to configure SMTP transport: {e}")))?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: Some(Arc::new(builder.build())),
            from: Some(from),
        })
    }

    /// A mailer that only logs.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            transport: None,
            from: None,
        }
    }

    /// Whether messages actually leave the server.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Send the password reset link.
    pub async fn send_password_reset(&self, recipient: &str, link: &str) -> AppResult<()> {
        let body = format!(
            "Hola. Para recuperar tu contraseña, haz clic aquí: {link}\n\nEl enlace vence en 30 minutos."
        );
        self.send(recipient, "Recuperar contraseña", &body).await
    }

    async fn send(&self, recipient: &str, subject: &str, body: &str) -> AppResult<()> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            tracing::info!(recipient, subject, body, "Email disabled; message not sent");
            return Ok(());
        };

        let to = recipient
            .parse::<Mailbox>()
            .map_err(|e| AppError::BadRequest(format!("Invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(from.clone())
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build email: {e}")))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to send email: {e}")))?;

        tracing::info!(subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_disables_transport() {
        let service = EmailService::new(None).unwrap();
        assert!(!service.is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_send_succeeds() {
        let service = EmailService::disabled();
        service
            .send_password_reset("alice@example.com", "http://localhost/reset-password/abc")
            .await
            .unwrap();
    }
}
