//! Helpers for inspecting submitted JSON values.

use serde_json::Value;

/// Returns whether a value counts as "nothing submitted".
///
/// Missing keys, `null`, the empty string and empty arrays/objects are empty.
/// Whitespace is not: strip it first if it should be.
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Bool(_) | Value::Number(_)) => false,
    }
}

/// Returns whether a value is truthy: non-empty, non-zero and not `false`.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        other => !is_empty(other),
    }
}

/// Renders a value the way it appears in an HTML attribute.
///
/// `null` has no text; compound values fall back to their JSON text.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Returns whether `candidate` is `value`, or one of its items when `value`
/// holds several selections.
pub(crate) fn selects(value: Option<&Value>, candidate: &str) -> bool {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .any(|item| value_text(item).as_deref() == Some(candidate)),
        Some(single) => value_text(single).as_deref() == Some(candidate),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_empty() {
        assert!(is_empty(None));
        assert!(is_empty(Some(&Value::Null)));
        assert!(is_empty(Some(&json!(""))));
        assert!(is_empty(Some(&json!([]))));
        assert!(is_empty(Some(&json!({}))));
        assert!(!is_empty(Some(&json!(" "))));
        assert!(!is_empty(Some(&json!(0))));
        assert!(!is_empty(Some(&json!(false))));
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!("0"))));
        assert!(is_truthy(Some(&json!(3))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(None));
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!("Fred")), Some("Fred".to_string()));
        assert_eq!(value_text(&json!(42)), Some("42".to_string()));
        assert_eq!(value_text(&json!(true)), Some("true".to_string()));
        assert_eq!(value_text(&Value::Null), None);
    }

    #[test]
    fn test_selects() {
        assert!(selects(Some(&json!("a")), "a"));
        assert!(selects(Some(&json!(["a", "b"])), "b"));
        assert!(selects(Some(&json!(2)), "2"));
        assert!(!selects(Some(&json!(["a", "b"])), "c"));
        assert!(!selects(None, "a"));
    }
}
