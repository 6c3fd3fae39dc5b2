//! Schema validation helpers.
//!
//! Validates a `serde_json::Value` against a [`Schema`] and reports every
//! problem as a [`Diagnostic`] carrying the offending attribute path.
//!
//! # Example
//!
//! ```
//! use revos_provider::schema::{Attribute, Schema};
//! use revos_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute("description", Attribute::optional_string());
//!
//! assert!(validate(&schema, &json!({"name": "sales"})).is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"name": 42}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("name".to_string()));
//! ```

use crate::schema::{Attribute, AttributeType, Diagnostic, Schema};
use serde_json::Value;

/// Validate a JSON value against a schema.
///
/// Returns a list of diagnostics for any validation errors found.
/// An empty list means the value is valid.
///
/// # Validation Rules
///
/// - The value must be an object (null is treated as an empty object)
/// - Required attributes must be present and non-null
/// - Optional attributes may be absent or null
/// - Computed-only attributes are skipped (the provider sets these)
/// - Attribute types must match the schema
/// - Attributes not declared in the schema are rejected
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let empty = serde_json::Map::new();
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            diagnostics.push(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", value_type_name(value))),
            );
            return diagnostics;
        },
    };

    let mut names: Vec<&String> = schema.attributes.keys().collect();
    names.sort();
    for name in names {
        validate_attribute(&schema.attributes[name], obj.get(name), name, &mut diagnostics);
    }

    let mut unknown: Vec<&String> = obj
        .keys()
        .filter(|key| !schema.attributes.contains_key(key.as_str()))
        .collect();
    unknown.sort();
    for key in unknown {
        diagnostics.push(
            Diagnostic::error(format!("Unsupported attribute '{}'", key))
                .with_detail("An attribute with this name is not expected here")
                .with_attribute(key.as_str()),
        );
    }

    diagnostics
}

/// Validate a JSON value against a schema, returning Ok if valid or Err with diagnostics.
///
/// This is a convenience wrapper around [`validate`] that returns a Result.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if attr.flags.computed && !attr.flags.optional && !attr.flags.required {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        },
        Some(v) => match attr.attr_type {
            AttributeType::String => {
                if !v.is_string() {
                    diagnostics.push(type_error(path, "string", v));
                }
            },
        },
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
        .with_detail(format!(
            "Expected {}, got {}",
            expected,
            value_type_name(got)
        ))
        .with_attribute(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn overlay_like() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("description", Attribute::optional_string())
    }

    #[test]
    fn test_validate_required_string() {
        let schema = overlay_like();

        assert!(validate(&schema, &json!({"name": "test"})).is_empty());

        let diagnostics = validate(&schema, &json!({}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("name".to_string()));

        let diagnostics = validate(&schema, &json!({"name": null}));
        assert_eq!(diagnostics.len(), 1);

        let diagnostics = validate(&schema, &json!({"name": 123}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid type"));
        assert_eq!(diagnostics[0].detail.as_deref(), Some("Expected string, got number"));
    }

    #[test]
    fn test_validate_optional_attribute() {
        let schema = overlay_like();

        assert!(validate(&schema, &json!({"name": "a", "description": "b"})).is_empty());
        assert!(validate(&schema, &json!({"name": "a", "description": null})).is_empty());

        let diagnostics = validate(&schema, &json!({"name": "a", "description": true}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("description".to_string()));
    }

    #[test]
    fn test_validate_computed_attribute_skipped() {
        let schema = overlay_like();
        assert!(validate(&schema, &json!({"name": "a", "id": 123})).is_empty());
    }

    #[test]
    fn test_validate_unknown_attribute() {
        let diagnostics = validate(&overlay_like(), &json!({"name": "a", "colour": "red"}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Unsupported attribute 'colour'"));
    }

    #[test]
    fn test_validate_multiple_errors_sorted() {
        let schema = Schema::v0()
            .with_attribute("token", Attribute::required_string())
            .with_attribute("api_url", Attribute::required_string());

        let diagnostics = validate(&schema, &json!({}));
        let paths: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_deref())
            .collect();
        assert_eq!(paths, vec!["api_url", "token"]);
    }

    #[test]
    fn test_validate_null_root_is_empty_object() {
        let schema = Schema::v0().with_attribute("api_url", Attribute::optional_string());
        assert!(validate(&schema, &Value::Null).is_empty());
    }

    #[test]
    fn test_validate_root_not_object() {
        let diagnostics = validate(&overlay_like(), &json!("not an object"));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Expected object"));
    }

    #[test]
    fn test_validate_result_helper() {
        let schema = overlay_like();
        assert!(validate_result(&schema, &json!({"name": "test"})).is_ok());
        assert_eq!(validate_result(&schema, &json!({})).unwrap_err().len(), 1);
    }
}
