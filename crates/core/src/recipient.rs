//! Recipient resolution from event payloads.
//!
//! Each channel has a fixed fallback chain of payload fields. A payload
//! that carries none of the candidate fields simply yields no recipient;
//! the notification factory treats that as "rule not applicable", not as
//! an error.

use serde_json::{Map, Value};

use crate::channel::Channel;

/// Payload fields checked, in order, for each channel.
fn candidate_fields(channel: Channel) -> &'static [&'static str] {
    match channel {
        Channel::Email => &["email", "user_email"],
        Channel::Sms => &["phone", "mobile"],
        Channel::Push => &["device_token", "fcm_token"],
        Channel::Webhook => &["webhook_url", "callback_url"],
    }
}

/// Extract a transport address for `channel` from the event payload.
///
/// Only non-empty string values resolve; a field holding a number or null
/// is treated as absent and the chain moves on.
pub fn resolve(channel: Channel, payload: &Map<String, Value>) -> Option<String> {
    candidate_fields(channel)
        .iter()
        .filter_map(|field| payload.get(*field))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn email_prefers_primary_field() {
        let p = payload(json!({"email": "a@x.com", "user_email": "b@x.com"}));
        assert_eq!(resolve(Channel::Email, &p).as_deref(), Some("a@x.com"));
    }

    #[test]
    fn email_falls_back_to_user_email() {
        let p = payload(json!({"user_email": "b@x.com"}));
        assert_eq!(resolve(Channel::Email, &p).as_deref(), Some("b@x.com"));
    }

    #[test]
    fn sms_fallback_chain() {
        assert_eq!(
            resolve(Channel::Sms, &payload(json!({"phone": "+1555"}))).as_deref(),
            Some("+1555")
        );
        assert_eq!(
            resolve(Channel::Sms, &payload(json!({"mobile": "+1666"}))).as_deref(),
            Some("+1666")
        );
    }

    #[test]
    fn push_and_webhook_chains() {
        assert_eq!(
            resolve(Channel::Push, &payload(json!({"fcm_token": "tok"}))).as_deref(),
            Some("tok")
        );
        assert_eq!(
            resolve(Channel::Webhook, &payload(json!({"callback_url": "https://cb"}))).as_deref(),
            Some("https://cb")
        );
    }

    #[test]
    fn missing_fields_yield_none() {
        let p = payload(json!({"unrelated": true}));
        assert_eq!(resolve(Channel::Email, &p), None);
        assert_eq!(resolve(Channel::Webhook, &p), None);
    }

    #[test]
    fn non_string_and_empty_values_are_skipped() {
        let p = payload(json!({"email": 42, "user_email": "b@x.com"}));
        assert_eq!(resolve(Channel::Email, &p).as_deref(), Some("b@x.com"));

        let p = payload(json!({"phone": ""}));
        assert_eq!(resolve(Channel::Sms, &p), None);
    }
}
