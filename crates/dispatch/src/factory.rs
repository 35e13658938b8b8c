//! Notification factory: expands one event into pending notifications.
//!
//! For each rule matched by [`matcher`](crate::matcher), the factory
//! resolves a recipient and renders the rule's template, then inserts a
//! Pending notification row. Per-rule problems (no recipient, missing
//! template, unparseable channel) skip that rule with a log line and
//! never abort processing of sibling rules. The event's `processed` flag
//! is the idempotency guard: an already-processed event short-circuits
//! before any rule work.

use chrono::Utc;
use herald_core::types::DbId;
use herald_core::{recipient, retry, template};
use herald_db::models::notification::NewNotification;
use herald_db::models::rule::Rule;
use herald_db::repositories::{EventRepo, NotificationRepo, TemplateRepo};
use herald_db::DbPool;

use crate::matcher;

/// Errors that abort processing of a whole event.
///
/// Per-rule failures are handled inside the factory and are not
/// represented here.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("Event {0} not found")]
    EventNotFound(DbId),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Creates notification rows from ingested events.
pub struct NotificationFactory;

impl NotificationFactory {
    /// Process a single event and create notifications for every matched
    /// rule. Returns the number of notifications created.
    ///
    /// Re-invocation on an already-processed event is a no-op returning
    /// zero.
    pub async fn process_event(pool: &DbPool, event_id: DbId) -> Result<usize, FactoryError> {
        let event = EventRepo::find_by_id(pool, event_id)
            .await?
            .ok_or(FactoryError::EventNotFound(event_id))?;

        if event.processed {
            tracing::warn!(event_id, "Event already processed, skipping");
            return Ok(0);
        }

        let payload = event.payload_object();
        let rules = matcher::matching_rules(pool, &event.event_type, &payload).await;

        let mut created = 0;
        for rule in &rules {
            match Self::create_for_rule(pool, event_id, &event.event_type, rule, &payload).await {
                Ok(true) => created += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        event_id,
                        rule_id = rule.id,
                        error = %e,
                        "Failed to create notification for rule"
                    );
                }
            }
        }

        // Flip the idempotency guard exactly once, regardless of per-rule
        // skips.
        EventRepo::mark_processed(pool, event_id).await?;

        tracing::info!(event_id, created, "Event processed");
        Ok(created)
    }

    /// Create one notification for a matched rule.
    ///
    /// Returns `Ok(false)` for deliberate skips (no recipient, no
    /// template); database errors propagate to the caller, which logs
    /// and continues with the next rule.
    async fn create_for_rule(
        pool: &DbPool,
        event_id: DbId,
        event_type: &str,
        rule: &Rule,
        payload: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<bool, sqlx::Error> {
        let channel = match rule.channel() {
            Ok(channel) => channel,
            Err(e) => {
                tracing::error!(rule_id = rule.id, error = %e, "Rule has invalid channel, skipping");
                return Ok(false);
            }
        };

        let Some(recipient) = recipient::resolve(channel, payload) else {
            tracing::warn!(rule_id = rule.id, channel = %channel, "No recipient in payload, skipping rule");
            return Ok(false);
        };

        let Some(template_id) = rule.template_id else {
            tracing::warn!(rule_id = rule.id, "Rule has no template, skipping");
            return Ok(false);
        };

        let Some(tpl) = TemplateRepo::find_by_id(pool, template_id).await? else {
            tracing::warn!(rule_id = rule.id, template_id, "Template not found, skipping rule");
            return Ok(false);
        };

        let (subject, body) = template::render_parts(tpl.subject.as_deref(), &tpl.body, payload);

        let notification = NewNotification {
            rule_id: rule.id,
            recipient,
            channel,
            subject,
            body,
            max_retries: retry::DEFAULT_MAX_RETRIES,
            scheduled_at: Utc::now(),
            metadata: serde_json::json!({
                "event_id": event_id,
                "rule_id": rule.id,
                "event_type": event_type,
            }),
        };

        let id = NotificationRepo::create(pool, &notification).await?;
        tracing::debug!(notification_id = id, rule_id = rule.id, "Notification created");
        Ok(true)
    }
}
