//! Push notification delivery via Firebase Cloud Messaging.
//!
//! Without an FCM server key in the environment the provider simulates
//! sends, logging and reporting success.

use std::time::Duration;

use async_trait::async_trait;

use super::{Provider, ProviderError};

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// FCM send endpoint.
const FCM_SEND_URL: &str = "https://fcm.googleapis.com/fcm/send";

/// FCM configuration.
#[derive(Debug, Clone)]
pub struct PushConfig {
    pub server_key: String,
}

impl PushConfig {
    /// Load configuration from the `FCM_SERVER_KEY` environment variable.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            server_key: std::env::var("FCM_SERVER_KEY").ok()?,
        })
    }
}

/// Sends push notifications through FCM.
pub struct PushProvider {
    client: reqwest::Client,
    config: Option<PushConfig>,
}

impl PushProvider {
    pub fn from_env() -> Self {
        let config = PushConfig::from_env();
        if config.is_none() {
            tracing::warn!("FCM_SERVER_KEY not set, push sends will be simulated");
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }
}

#[async_trait]
impl Provider for PushProvider {
    async fn send(
        &self,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
        _metadata: &serde_json::Value,
    ) -> Result<(), ProviderError> {
        let Some(config) = &self.config else {
            tracing::info!(to = recipient, "FCM not configured, simulating push send");
            return Ok(());
        };

        let payload = serde_json::json!({
            "to": recipient,
            "notification": {
                "title": subject,
                "body": body,
            },
        });

        let response = self
            .client
            .post(FCM_SEND_URL)
            .header("Authorization", format!("key={}", config.server_key))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status().as_u16()));
        }

        tracing::info!(to = recipient, "Push notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_provider_simulates_success() {
        let provider = {
            let _env = crate::env_guard();
            std::env::remove_var("FCM_SERVER_KEY");
            PushProvider::from_env()
        };
        let result = provider
            .send("device-token", Some("hi"), "body", &serde_json::Value::Null)
            .await;
        assert!(result.is_ok());
    }
}
