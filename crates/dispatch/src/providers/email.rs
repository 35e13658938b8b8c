//! Email delivery via SMTP.
//!
//! Wraps the `lettre` async SMTP transport. Configuration is loaded from
//! environment variables; if `SMTP_HOST` is not set the provider runs in
//! simulation mode: sends are logged and reported as successful, which
//! keeps development environments working without a mail relay.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{Provider, ProviderError};

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@herald.local";

/// Subject used when a notification has none.
const DEFAULT_SUBJECT: &str = "Notification";

/// Configuration for the SMTP email provider.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery should be simulated.
    ///
    /// | Variable        | Required | Default                 |
    /// |-----------------|----------|-------------------------|
    /// | `SMTP_HOST`     | yes      | —                       |
    /// | `SMTP_PORT`     | no       | `587`                   |
    /// | `SMTP_FROM`     | no       | `noreply@herald.local`  |
    /// | `SMTP_USER`     | no       | —                       |
    /// | `SMTP_PASSWORD` | no       | —                       |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

/// Sends notification emails via SMTP.
pub struct EmailProvider {
    config: Option<EmailConfig>,
}

impl EmailProvider {
    pub fn from_env() -> Self {
        let config = EmailConfig::from_env();
        if config.is_none() {
            tracing::warn!("SMTP_HOST not set, email sends will be simulated");
        }
        Self { config }
    }
}

#[async_trait]
impl Provider for EmailProvider {
    async fn send(
        &self,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
        _metadata: &serde_json::Value,
    ) -> Result<(), ProviderError> {
        let Some(config) = &self.config else {
            tracing::info!(to = recipient, "SMTP not configured, simulating email send");
            return Ok(());
        };

        let from = config
            .from_address
            .parse()
            .map_err(|e| ProviderError::Config(format!("Invalid from address: {e}")))?;
        let to = recipient
            .parse()
            .map_err(|e| ProviderError::Config(format!("Invalid recipient address: {e}")))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject.unwrap_or(DEFAULT_SUBJECT))
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
            .map_err(|e| ProviderError::Config(format!("Failed to build message: {e}")))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = recipient, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        let _env = crate::env_guard();
        std::env::remove_var("SMTP_HOST");
        assert!(EmailConfig::from_env().is_none());
    }

    #[tokio::test]
    async fn unconfigured_provider_simulates_success() {
        let provider = {
            let _env = crate::env_guard();
            std::env::remove_var("SMTP_HOST");
            EmailProvider::from_env()
        };
        let result = provider
            .send("a@b.c", Some("hi"), "body", &serde_json::Value::Null)
            .await;
        assert!(result.is_ok());
    }
}
