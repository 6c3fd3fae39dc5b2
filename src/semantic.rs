//! Semantic equality of JSON documents.
//!
//! The Revos API stores overlay data as JSON and hands it back re-serialized,
//! usually with a different key order than what was submitted. Comparing the
//! raw strings would report a change on every refresh, so plans and reads
//! compare documents with [`json_equal`] instead.
//!
//! Object key order is ignored. Array order is not.
//!
//! ```
//! use revos_provider::semantic::json_equal;
//!
//! assert!(json_equal(r#"{"a":1,"b":2}"#, r#"{"b":2,"a":1}"#));
//! assert!(!json_equal(r#"{"arr":[1,2,3]}"#, r#"{"arr":[3,2,1]}"#));
//! assert!(!json_equal("not json", r#"{"foo":"bar"}"#));
//! ```

use serde_json::Value;

/// Compare two JSON-encoded strings for semantic equality.
///
/// Returns `false` when either input fails to parse. A corrupt value is
/// therefore always reported as drift, never silently accepted.
pub fn json_equal(a: &str, b: &str) -> bool {
    let (Ok(a), Ok(b)) = (
        serde_json::from_str::<Value>(a),
        serde_json::from_str::<Value>(b),
    ) else {
        return false;
    };
    values_equal(&a, &b)
}

/// Recursively compare two decoded JSON values.
///
/// Numbers are compared by their `f64` value, so `1`, `1.0` and `1e0` are equal.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, va)| b.get(key).is_some_and(|vb| values_equal(va, vb)))
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(va, vb)| values_equal(va, vb))
        },
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_equal_cases() {
        let cases = [
            ("identical", r#"{"foo": "bar"}"#, r#"{"foo": "bar"}"#, true),
            ("key order", r#"{"a": 1, "b": 2}"#, r#"{"b": 2, "a": 1}"#, true),
            (
                "nested key order",
                r#"{"joins":{"clerk_Organizations":{"relationship":"one_to_many","sql":"x"},"clerk_Users":{"relationship":"one_to_many","sql":"y"}}}"#,
                r#"{"joins":{"clerk_Users":{"sql":"y","relationship":"one_to_many"},"clerk_Organizations":{"sql":"x","relationship":"one_to_many"}}}"#,
                true,
            ),
            ("different values", r#"{"foo": "bar"}"#, r#"{"foo": "baz"}"#, false),
            ("different keys", r#"{"foo": "bar"}"#, r#"{"baz": "bar"}"#, false),
            ("extra key", r#"{"foo": "bar"}"#, r#"{"foo": "bar", "extra": "value"}"#, false),
            ("arrays same order", r#"{"arr": [1, 2, 3]}"#, r#"{"arr": [1, 2, 3]}"#, true),
            ("arrays reordered", r#"{"arr": [1, 2, 3]}"#, r#"{"arr": [3, 2, 1]}"#, false),
            ("arrays of objects", r#"[{"a": 1}, {"b": 2}]"#, r#"[{"a": 1}, {"b": 2}]"#, true),
            ("invalid first", "not json", r#"{"foo": "bar"}"#, false),
            ("invalid second", r#"{"foo": "bar"}"#, "not json", false),
            ("both invalid", "not json", "not json", false),
            ("empty objects", "{}", "{}", true),
            ("nulls", r#"{"foo": null}"#, r#"{"foo": null}"#, true),
            ("null vs missing", r#"{"foo": null}"#, "{}", false),
            ("booleans differ", r#"{"flag": true}"#, r#"{"flag": false}"#, false),
            ("object vs array", r#"{"a": "b"}"#, r#"["a", "b"]"#, false),
            ("string vs number", r#""42""#, "42", false),
            ("whitespace", "{\n  \"a\" : [ 1 ]\n}", r#"{"a":[1]}"#, true),
        ];

        for (name, a, b, expected) in cases {
            assert_eq!(json_equal(a, b), expected, "case: {}", name);
        }
    }

    #[test]
    fn test_numbers_compare_by_value() {
        assert!(json_equal("1", "1.0"));
        assert!(json_equal(r#"{"n": 100}"#, r#"{"n": 1e2}"#));
        assert!(json_equal("-0.5", "-5e-1"));
        assert!(!json_equal("1", "1.5"));
    }

    #[test]
    fn test_values_equal() {
        assert!(values_equal(&json!("foo"), &json!("foo")));
        assert!(!values_equal(&json!("foo"), &json!("bar")));
        assert!(values_equal(&json!(null), &json!(null)));
        assert!(!values_equal(&json!(null), &json!("foo")));
        assert!(!values_equal(&json!({"a": "b"}), &json!({"a": "b", "c": "d"})));
        assert!(!values_equal(&json!(["a"]), &json!(["a", "b"])));
        assert!(values_equal(
            &json!({"nested": {"deep": [1, 2]}}),
            &json!({"nested": {"deep": [1, 2]}})
        ));
    }
}
