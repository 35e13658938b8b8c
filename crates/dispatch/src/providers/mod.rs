//! Outbound transport providers.
//!
//! Each channel has one provider implementing [`Provider::send`]. The
//! [`ProviderRegistry`] owns all four and resolves them by [`Channel`]
//! variant — a closed match, so an unknown transport cannot exist at
//! runtime.

pub mod email;
pub mod push;
pub mod sms;
pub mod webhook;

use async_trait::async_trait;
use herald_core::channel::Channel;

pub use email::EmailProvider;
pub use push::PushProvider;
pub use sms::SmsProvider;
pub use webhook::WebhookProvider;

/// Error type for transport send failures.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider is misconfigured (bad sender address, malformed
    /// recipient). Not retryable.
    #[error("Provider configuration error: {0}")]
    Config(String),

    /// The underlying HTTP request failed (network, DNS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote endpoint returned a non-success status code.
    #[error("Transport returned HTTP {0}")]
    HttpStatus(u16),

    /// SMTP transport-level failure (authentication, connection).
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The attempt exceeded the send timeout.
    #[error("Send timed out after {0} seconds")]
    Timeout(u64),
}

impl ProviderError {
    /// Configuration errors mark the notification failed immediately
    /// instead of consuming retries.
    pub fn is_permanent(&self) -> bool {
        matches!(self, ProviderError::Config(_))
    }
}

/// A single outbound transport.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Deliver one notification to `recipient`.
    async fn send(
        &self,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
        metadata: &serde_json::Value,
    ) -> Result<(), ProviderError>;
}

/// The closed set of transports, one per channel.
pub struct ProviderRegistry {
    email: EmailProvider,
    sms: SmsProvider,
    push: PushProvider,
    webhook: WebhookProvider,
}

impl ProviderRegistry {
    /// Build all providers from environment configuration.
    ///
    /// Providers whose upstream credentials are absent fall back to
    /// simulated sends (logged as such), so a development setup works
    /// without any external services.
    pub fn from_env() -> Self {
        Self {
            email: EmailProvider::from_env(),
            sms: SmsProvider::from_env(),
            push: PushProvider::from_env(),
            webhook: WebhookProvider::new(),
        }
    }

    /// Resolve the provider for a channel.
    pub fn get(&self, channel: Channel) -> &dyn Provider {
        match channel {
            Channel::Email => &self.email,
            Channel::Sms => &self.sms,
            Channel::Push => &self.push,
            Channel::Webhook => &self.webhook,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::channel::ALL_CHANNELS;

    #[tokio::test]
    async fn registry_resolves_every_channel() {
        let registry = {
            let _env = crate::env_guard();
            ProviderRegistry::from_env()
        };
        for channel in ALL_CHANNELS {
            // A closed match cannot fail; this guards against a future
            // variant being added without a provider.
            let _provider = registry.get(channel);
        }
    }

    #[test]
    fn config_errors_are_permanent() {
        assert!(ProviderError::Config("bad from address".into()).is_permanent());
        assert!(!ProviderError::HttpStatus(502).is_permanent());
        assert!(!ProviderError::Timeout(30).is_permanent());
    }

    #[test]
    fn error_display() {
        assert_eq!(
            ProviderError::HttpStatus(502).to_string(),
            "Transport returned HTTP 502"
        );
        assert_eq!(
            ProviderError::Timeout(30).to_string(),
            "Send timed out after 30 seconds"
        );
    }
}
