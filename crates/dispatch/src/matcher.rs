//! Rule matching for ingested events.
//!
//! The database query already restricts to active rules for the event
//! type; condition filtering and ranking happen here as a pure function
//! so the ordering contract is testable without a database.

use herald_core::conditions;
use herald_db::models::rule::Rule;
use herald_db::repositories::RuleRepo;
use herald_db::DbPool;
use serde_json::{Map, Value};

/// Filter rules by condition evaluation and rank them.
///
/// Ordering: higher `priority` first, ties broken by rule ID ascending.
/// Stable across repeated invocations on unchanged input.
pub fn rank_matching(mut rules: Vec<Rule>, payload: &Map<String, Value>) -> Vec<Rule> {
    rules.retain(|rule| conditions::evaluate(&rule.conditions_object(), payload));
    rules.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
    rules
}

/// Fetch, filter, and rank the active rules matching an event.
///
/// Repository failure degrades to an empty match set: the caller decides
/// whether no matches is fatal, and the error is logged rather than
/// propagated.
pub async fn matching_rules(
    pool: &DbPool,
    event_type: &str,
    payload: &Map<String, Value>,
) -> Vec<Rule> {
    let rules = match RuleRepo::list_active_for_event(pool, event_type).await {
        Ok(rules) => rules,
        Err(e) => {
            tracing::error!(event_type, error = %e, "Failed to load rules, treating as no matches");
            return Vec::new();
        }
    };

    let matched = rank_matching(rules, payload);
    tracing::info!(event_type, count = matched.len(), "Matched rules for event");
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use herald_core::types::DbId;
    use serde_json::json;

    fn rule(id: DbId, channel: &str, priority: i32, conditions: Value) -> Rule {
        let now = Utc::now();
        Rule {
            id,
            name: format!("rule-{id}"),
            event_type: "user_signup".into(),
            notification_type: channel.into(),
            template_id: Some(1),
            conditions,
            is_active: true,
            priority,
            created_at: now,
            updated_at: now,
        }
    }

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn signup_event_matches_both_rules_sms_first() {
        // Unconditional email rule at priority 1, SMS rule gated on
        // send_sms at priority 2: both match, SMS ranks first.
        let rules = vec![
            rule(1, "email", 1, json!({})),
            rule(
                2,
                "sms",
                2,
                json!({"send_sms": {"operator": "equals", "value": true}}),
            ),
        ];
        let p = payload(json!({
            "user_name": "John",
            "email": "john@x.com",
            "phone": "+1",
            "send_sms": true,
        }));

        let matched = rank_matching(rules, &p);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].notification_type, "sms");
        assert_eq!(matched[1].notification_type, "email");
    }

    #[test]
    fn amount_gate_excludes_small_orders() {
        let rules = vec![rule(
            1,
            "email",
            1,
            json!({"amount": {"operator": "greater_than", "value": 100}}),
        )];
        let matched = rank_matching(rules, &payload(json!({"amount": 50})));
        assert!(matched.is_empty());
    }

    #[test]
    fn equal_priority_breaks_ties_by_id() {
        let rules = vec![
            rule(9, "email", 5, json!({})),
            rule(3, "sms", 5, json!({})),
            rule(7, "push", 5, json!({})),
        ];
        let matched = rank_matching(rules, &Map::new());
        let ids: Vec<_> = matched.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 7, 9]);
    }

    #[test]
    fn ranking_is_stable_across_invocations() {
        let make = || {
            vec![
                rule(2, "email", 1, json!({})),
                rule(1, "sms", 3, json!({})),
                rule(3, "push", 2, json!({})),
            ]
        };
        let p = Map::new();
        let first: Vec<_> = rank_matching(make(), &p).iter().map(|r| r.id).collect();
        let second: Vec<_> = rank_matching(make(), &p).iter().map(|r| r.id).collect();
        assert_eq!(first, vec![1, 3, 2]);
        assert_eq!(first, second);
    }
}
