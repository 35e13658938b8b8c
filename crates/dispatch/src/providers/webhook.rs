//! Webhook delivery: JSON POST to the recipient URL.
//!
//! The recipient *is* the destination URL (resolved from the event
//! payload's `webhook_url`/`callback_url` fields). Retry scheduling lives
//! in the delivery state machine, not here — a single attempt either
//! succeeds or reports its failure upward.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::{Provider, ProviderError};

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers notifications to external webhook endpoints.
pub struct WebhookProvider {
    client: reqwest::Client,
}

impl WebhookProvider {
    /// Create a provider with a pre-configured HTTP client.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client }
    }
}

impl Default for WebhookProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for WebhookProvider {
    async fn send(
        &self,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
        metadata: &serde_json::Value,
    ) -> Result<(), ProviderError> {
        let payload = serde_json::json!({
            "subject": subject,
            "body": body,
            "metadata": metadata,
            "timestamp": Utc::now(),
        });

        let response = self.client.post(recipient).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status().as_u16()));
        }

        tracing::info!(url = recipient, "Webhook delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_does_not_panic() {
        let _provider = WebhookProvider::new();
    }

    #[tokio::test]
    async fn unreachable_url_is_a_request_error() {
        let provider = WebhookProvider::new();
        let result = provider
            .send("http://127.0.0.1:1/none", None, "body", &serde_json::Value::Null)
            .await;
        assert!(matches!(result, Err(ProviderError::Request(_))));
    }
}
