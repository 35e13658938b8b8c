//! Rule condition evaluator — pure logic, no database access.
//!
//! A rule's `conditions` column is a JSON object mapping payload field
//! names to `{"operator": ..., "value": ...}` objects. All conditions must
//! pass for the rule to match (logical AND). The evaluator is deliberately
//! permissive about missing fields: a field absent from the payload skips
//! its condition rather than vetoing the rule, unless the rule explicitly
//! checks `exists`. Evaluation errors (bad numeric coercion, a non-list
//! value for `in_list`) make the whole rule non-matching; they never
//! propagate to the caller.

use serde_json::{Map, Value};

/// Supported comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
    InList,
    Exists,
}

impl Operator {
    /// Parse the operator name used in stored conditions.
    ///
    /// Returns `None` for unknown names; unknown operators are skipped
    /// during evaluation rather than failing the rule.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "equals" => Some(Operator::Equals),
            "not_equals" => Some(Operator::NotEquals),
            "greater_than" => Some(Operator::GreaterThan),
            "less_than" => Some(Operator::LessThan),
            "contains" => Some(Operator::Contains),
            "in_list" => Some(Operator::InList),
            "exists" => Some(Operator::Exists),
            _ => None,
        }
    }
}

/// Evaluate all conditions against an event payload.
///
/// An empty condition set always matches (unconditional rule).
pub fn evaluate(conditions: &Map<String, Value>, payload: &Map<String, Value>) -> bool {
    for (field, condition) in conditions {
        // Conditions must be objects; anything else is ignored.
        let Some(condition) = condition.as_object() else {
            continue;
        };

        let operator = condition
            .get("operator")
            .and_then(Value::as_str)
            .and_then(Operator::parse);
        let Some(operator) = operator else {
            continue;
        };

        let expected = condition.get("value").unwrap_or(&Value::Null);

        let Some(actual) = payload.get(field) else {
            if operator == Operator::Exists {
                return false;
            }
            continue;
        };

        match check(operator, actual, expected) {
            Some(true) => {}
            // A failed check or an evaluation error both make the rule
            // non-matching.
            Some(false) | None => return false,
        }
    }

    true
}

/// Apply a single operator. `None` signals an evaluation error.
fn check(operator: Operator, actual: &Value, expected: &Value) -> Option<bool> {
    match operator {
        Operator::Equals => Some(actual == expected),
        Operator::NotEquals => Some(actual != expected),
        Operator::GreaterThan => Some(as_number(actual)? > as_number(expected)?),
        Operator::LessThan => Some(as_number(actual)? < as_number(expected)?),
        Operator::Contains => {
            let needle = expected.as_str()?;
            Some(coerce_string(actual).contains(needle))
        }
        Operator::InList => {
            let list = expected.as_array()?;
            Some(list.contains(actual))
        }
        // The field was present, or we would have bailed earlier.
        Operator::Exists => Some(true),
    }
}

/// Numeric coercion for ordering comparisons.
///
/// Accepts JSON numbers, booleans (`true` = 1), and numeric strings.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// String coercion used by `contains`: strings are taken verbatim, every
/// other value uses its JSON representation.
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().expect("fixture must be an object").clone()
    }

    fn condition(field: &str, operator: &str, value: Value) -> Map<String, Value> {
        obj(json!({ field: { "operator": operator, "value": value } }))
    }

    #[test]
    fn empty_conditions_always_match() {
        let payload = obj(json!({"anything": 1}));
        assert!(evaluate(&Map::new(), &payload));
        assert!(evaluate(&Map::new(), &Map::new()));
    }

    #[test]
    fn equals_matches_and_rejects() {
        let conditions = condition("plan", "equals", json!("pro"));
        assert!(evaluate(&conditions, &obj(json!({"plan": "pro"}))));
        assert!(!evaluate(&conditions, &obj(json!({"plan": "free"}))));
    }

    #[test]
    fn not_equals() {
        let conditions = condition("plan", "not_equals", json!("free"));
        assert!(evaluate(&conditions, &obj(json!({"plan": "pro"}))));
        assert!(!evaluate(&conditions, &obj(json!({"plan": "free"}))));
    }

    #[test]
    fn greater_than_numeric() {
        let conditions = condition("amount", "greater_than", json!(100));
        assert!(evaluate(&conditions, &obj(json!({"amount": 150}))));
        assert!(!evaluate(&conditions, &obj(json!({"amount": 50}))));
        assert!(!evaluate(&conditions, &obj(json!({"amount": 100}))));
    }

    #[test]
    fn greater_than_coerces_numeric_strings() {
        let conditions = condition("amount", "greater_than", json!("100"));
        assert!(evaluate(&conditions, &obj(json!({"amount": "150.5"}))));
    }

    #[test]
    fn greater_than_coercion_failure_rejects_rule() {
        let conditions = condition("amount", "greater_than", json!(100));
        assert!(!evaluate(&conditions, &obj(json!({"amount": "not a number"}))));
    }

    #[test]
    fn less_than() {
        let conditions = condition("amount", "less_than", json!(100));
        assert!(evaluate(&conditions, &obj(json!({"amount": 50}))));
        assert!(!evaluate(&conditions, &obj(json!({"amount": 150}))));
    }

    #[test]
    fn contains_substring() {
        let conditions = condition("email", "contains", json!("@example.com"));
        assert!(evaluate(&conditions, &obj(json!({"email": "a@example.com"}))));
        assert!(!evaluate(&conditions, &obj(json!({"email": "a@other.org"}))));
    }

    #[test]
    fn contains_coerces_non_string_payload_values() {
        let conditions = condition("code", "contains", json!("40"));
        assert!(evaluate(&conditions, &obj(json!({"code": 404}))));
    }

    #[test]
    fn contains_with_non_string_needle_rejects_rule() {
        let conditions = condition("code", "contains", json!(40));
        assert!(!evaluate(&conditions, &obj(json!({"code": "404"}))));
    }

    #[test]
    fn in_list_membership() {
        let conditions = condition("tier", "in_list", json!(["gold", "silver"]));
        assert!(evaluate(&conditions, &obj(json!({"tier": "gold"}))));
        assert!(!evaluate(&conditions, &obj(json!({"tier": "bronze"}))));
    }

    #[test]
    fn in_list_with_non_list_value_rejects_rule() {
        let conditions = condition("tier", "in_list", json!("gold"));
        assert!(!evaluate(&conditions, &obj(json!({"tier": "gold"}))));
    }

    #[test]
    fn exists_passes_when_present() {
        let conditions = condition("email", "exists", Value::Null);
        assert!(evaluate(&conditions, &obj(json!({"email": "a@b.c"}))));
    }

    #[test]
    fn exists_fails_when_missing_regardless_of_other_conditions() {
        let mut conditions = condition("email", "exists", Value::Null);
        conditions.extend(condition("plan", "equals", json!("pro")));
        assert!(!evaluate(&conditions, &obj(json!({"plan": "pro"}))));
    }

    #[test]
    fn missing_field_skips_non_exists_condition() {
        let conditions = condition("amount", "greater_than", json!(100));
        // "amount" absent: the condition is skipped, the rule still matches.
        assert!(evaluate(&conditions, &obj(json!({"other": 1}))));
    }

    #[test]
    fn unknown_operator_is_skipped() {
        let conditions = condition("plan", "matches_regex", json!(".*"));
        assert!(evaluate(&conditions, &obj(json!({"plan": "pro"}))));
    }

    #[test]
    fn non_object_condition_is_skipped() {
        let conditions = obj(json!({"plan": "pro"}));
        assert!(evaluate(&conditions, &obj(json!({"plan": "free"}))));
    }

    #[test]
    fn all_conditions_must_pass() {
        let mut conditions = condition("plan", "equals", json!("pro"));
        conditions.extend(condition("amount", "greater_than", json!(100)));
        assert!(evaluate(
            &conditions,
            &obj(json!({"plan": "pro", "amount": 200}))
        ));
        assert!(!evaluate(
            &conditions,
            &obj(json!({"plan": "pro", "amount": 50}))
        ));
    }
}
