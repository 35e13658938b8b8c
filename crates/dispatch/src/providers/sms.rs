//! SMS delivery via the Twilio REST API.
//!
//! Without Twilio credentials in the environment the provider simulates
//! sends, logging and reporting success.

use std::time::Duration;

use async_trait::async_trait;

use super::{Provider, ProviderError};

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Twilio account configuration.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl SmsConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` unless `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`,
    /// and `TWILIO_FROM_NUMBER` are all set.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            account_sid: std::env::var("TWILIO_ACCOUNT_SID").ok()?,
            auth_token: std::env::var("TWILIO_AUTH_TOKEN").ok()?,
            from_number: std::env::var("TWILIO_FROM_NUMBER").ok()?,
        })
    }
}

/// Sends SMS notifications through Twilio.
pub struct SmsProvider {
    client: reqwest::Client,
    config: Option<SmsConfig>,
}

impl SmsProvider {
    pub fn from_env() -> Self {
        let config = SmsConfig::from_env();
        if config.is_none() {
            tracing::warn!("Twilio credentials not set, SMS sends will be simulated");
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }
}

#[async_trait]
impl Provider for SmsProvider {
    async fn send(
        &self,
        recipient: &str,
        _subject: Option<&str>,
        body: &str,
        _metadata: &serde_json::Value,
    ) -> Result<(), ProviderError> {
        let Some(config) = &self.config else {
            tracing::info!(to = recipient, "Twilio not configured, simulating SMS send");
            return Ok(());
        };

        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            config.account_sid
        );
        let params = [
            ("To", recipient),
            ("From", config.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&config.account_sid, Some(&config.auth_token))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status().as_u16()));
        }

        tracing::info!(to = recipient, "SMS sent");
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
            std::env::remove_var("TWILIO_ACCOUNT_SID");
            SmsProvider::from_env()
        };
        let result = provider
            .send("+15550100", None, "hello", &serde_json::Value::Null)
            .await;
        assert!(result.is_ok());
    }
}
