//! Property-based tests for semantic JSON equality.

use proptest::prelude::*;
use revos_provider::json_equal;
use serde_json::{Map, Value};

/// Arbitrary JSON documents, a few levels deep.
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-z0-9 ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Serialize with object keys written in reverse order at every level.
fn to_reversed_text(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let members: Vec<String> = map
                .iter()
                .rev()
                .map(|(k, v)| format!("{}: {}", Value::String(k.clone()), to_reversed_text(v)))
                .collect();
            format!("{{ {} }}", members.join(", "))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(to_reversed_text).collect();
            format!("[{}]", items.join(","))
        }
        other => other.to_string(),
    }
}

proptest! {
    #[test]
    fn reflexive(value in arb_json()) {
        let text = value.to_string();
        prop_assert!(json_equal(&text, &text));
    }

    #[test]
    fn key_order_and_whitespace_are_ignored(value in arb_json()) {
        let compact = value.to_string();
        let pretty = serde_json::to_string_pretty(&value).unwrap();
        let reversed = to_reversed_text(&value);

        prop_assert!(json_equal(&compact, &pretty));
        prop_assert!(json_equal(&compact, &reversed));
        prop_assert!(json_equal(&reversed, &compact));
    }

    #[test]
    fn array_order_matters(a in any::<i32>(), b in any::<i32>()) {
        prop_assume!(a != b);
        let (forward, backward) = (format!("[{},{}]", a, b), format!("[{},{}]", b, a));
        prop_assert!(!json_equal(&forward, &backward));
    }

    #[test]
    fn invalid_text_never_equals(value in arb_json(), junk in "[{\\[][a-z:,]{0,6}") {
        let valid = value.to_string();
        prop_assert!(!json_equal(&junk, &valid));
        prop_assert!(!json_equal(&valid, &junk));
        prop_assert!(!json_equal(&junk, &junk));
    }

    #[test]
    fn integer_and_float_forms_match(n in -1_000_000i64..1_000_000) {
        let (integer, float) = (n.to_string(), format!("{}.0", n));
        prop_assert!(json_equal(&integer, &float));
    }

    #[test]
    fn extra_member_breaks_equality(key in "[a-z]{1,6}", n in any::<i32>()) {
        let mut map = Map::new();
        map.insert(key.clone(), Value::from(n));
        let base = Value::Object(map.clone());
        map.insert(format!("{}_extra", key), Value::Null);
        let extended = Value::Object(map);

        prop_assert!(!json_equal(&base.to_string(), &extended.to_string()));
    }
}
