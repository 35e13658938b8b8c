//! The closed set of outbound notification channels.
//!
//! Channels are stored in the `notification_type` column as lowercase
//! strings and resolved to a transport provider by enum variant, never by
//! free-form string lookup.

use serde::{Deserialize, Serialize};

/// An outbound delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Push,
    Webhook,
}

/// All channels, in a fixed order (used by analytics and the provider
/// registry).
pub const ALL_CHANNELS: [Channel; 4] = [
    Channel::Email,
    Channel::Sms,
    Channel::Push,
    Channel::Webhook,
];

impl Channel {
    /// The database / wire representation of the channel.
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Push => "push",
            Channel::Webhook => "webhook",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Channel::Email),
            "sms" => Ok(Channel::Sms),
            "push" => Ok(Channel::Push),
            "webhook" => Ok(Channel::Webhook),
            other => Err(crate::CoreError::Validation(format!(
                "Unknown notification channel: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for channel in ALL_CHANNELS {
            assert_eq!(channel.as_str().parse::<Channel>().unwrap(), channel);
        }
    }

    #[test]
    fn unknown_channel_is_rejected() {
        assert!("carrier_pigeon".parse::<Channel>().is_err());
    }

    #[test]
    fn serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&Channel::Sms).unwrap(), "\"sms\"");
        let parsed: Channel = serde_json::from_str("\"webhook\"").unwrap();
        assert_eq!(parsed, Channel::Webhook);
    }
}
