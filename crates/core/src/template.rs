//! `{{variable}}` template expansion.
//!
//! Placeholders are replaced with string-coerced payload values. A
//! placeholder whose variable is absent from the payload is left verbatim,
//! so malformed rendering stays visible downstream instead of being
//! silently blanked.

use serde_json::{Map, Value};

use crate::conditions::coerce_string;

/// Expand every `{{name}}` placeholder in `pattern` against the payload.
pub fn render(pattern: &str, payload: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                match payload.get(name) {
                    Some(value) => out.push_str(&coerce_string(value)),
                    None => {
                        // Unresolved placeholder: keep it verbatim.
                        out.push_str(&rest[start..start + 2 + end + 2]);
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                // Unterminated opener, emit the remainder as-is.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Render an optional subject and a body against the same payload.
pub fn render_parts(
    subject: Option<&str>,
    body: &str,
    payload: &Map<String, Value>,
) -> (Option<String>, String) {
    (
        subject.map(|s| render(s, payload)),
        render(body, payload),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn substitutes_string_variables() {
        let p = payload(json!({"user_name": "John"}));
        assert_eq!(render("Welcome {{user_name}}!", &p), "Welcome John!");
    }

    #[test]
    fn substitutes_multiple_and_repeated_variables() {
        let p = payload(json!({"a": "1", "b": "2"}));
        assert_eq!(render("{{a}}-{{b}}-{{a}}", &p), "1-2-1");
    }

    #[test]
    fn coerces_numbers_and_bools() {
        let p = payload(json!({"order_id": 42, "express": true}));
        assert_eq!(
            render("Order #{{order_id}} express={{express}}", &p),
            "Order #42 express=true"
        );
    }

    #[test]
    fn unresolved_placeholder_stays_verbatim() {
        let p = payload(json!({"a": "x"}));
        assert_eq!(render("{{a}} {{missing}}", &p), "x {{missing}}");
    }

    #[test]
    fn tolerates_whitespace_inside_braces() {
        let p = payload(json!({"name": "Ada"}));
        assert_eq!(render("Hi {{ name }}", &p), "Hi Ada");
    }

    #[test]
    fn unterminated_opener_is_left_alone() {
        let p = payload(json!({"a": "x"}));
        assert_eq!(render("{{a}} and {{broken", &p), "x and {{broken");
    }

    #[test]
    fn no_placeholders_is_identity() {
        assert_eq!(render("plain text", &Map::new()), "plain text");
    }

    #[test]
    fn render_parts_handles_missing_subject() {
        let p = payload(json!({"x": "1"}));
        let (subject, body) = render_parts(None, "body {{x}}", &p);
        assert_eq!(subject, None);
        assert_eq!(body, "body 1");

        let (subject, _) = render_parts(Some("s {{x}}"), "b", &p);
        assert_eq!(subject.as_deref(), Some("s 1"));
    }
}
