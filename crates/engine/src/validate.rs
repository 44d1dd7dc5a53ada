// ABOUTME: Post-extraction type check comparing extracted values against their declared field types.
// ABOUTME: Reports mismatches as diagnostics; it never alters the result.

use std::fmt;

use serde_json::Value;

use crate::config::{ExtractionConfig, FieldType, ScalarType};
use crate::result::ExtractionResult;

/// A value whose JSON type differs from the one its rule declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    /// `field`, `field.subkey` or `field[index]`
    pub path: String,
    pub expected: &'static str,
    pub found: &'static str,
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.path, self.expected, self.found
        )
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The JSON type name a declared type requires, or `None` when any value is accepted.
fn declared(ty: FieldType) -> Option<&'static str> {
    match ty {
        FieldType::Number => Some("number"),
        FieldType::String => Some("string"),
        FieldType::Boolean => Some("boolean"),
        FieldType::Array => Some("array"),
        FieldType::Object => Some("object"),
        FieldType::Raw | FieldType::Custom => None,
    }
}

fn declared_scalar(ty: ScalarType) -> Option<&'static str> {
    match ty {
        ScalarType::Number => Some("number"),
        ScalarType::String => Some("string"),
        ScalarType::Boolean => Some("boolean"),
        ScalarType::Raw => None,
    }
}

fn compare(out: &mut Vec<TypeMismatch>, path: String, expected: Option<&'static str>, value: &Value) {
    let Some(expected) = expected else {
        return;
    };
    if value.is_null() {
        return;
    }
    let found = json_type(value);
    if found != expected {
        out.push(TypeMismatch {
            path,
            expected,
            found,
        });
    }
}

/// Checks every configured field of `result` against its declared type.
///
/// `null` never mismatches. Object sub-keys are checked against their
/// mapping rule's `type` and array items against `getItemType`.
pub fn check(result: &ExtractionResult, config: &ExtractionConfig) -> Vec<TypeMismatch> {
    let mut out = Vec::new();
    for (path, field) in config.iter() {
        let Some(value) = result.get(path) else {
            continue;
        };
        compare(&mut out, path.clone(), declared(field.field_type), value);

        match (field.field_type, value) {
            (FieldType::Array, Value::Array(items)) => {
                let expected = field.get_item_type.and_then(declared_scalar);
                for (i, item) in items.iter().enumerate() {
                    compare(&mut out, format!("{}[{}]", path, i), expected, item);
                }
            }
            (FieldType::Object, Value::Object(obj)) => {
                let Some(mapping) = &field.object_mapping else {
                    continue;
                };
                for (key, rule) in mapping {
                    if let Some(sub) = obj.get(key) {
                        let expected = rule.value_type.and_then(declared);
                        compare(&mut out, format!("{}.{}", path, key), expected, sub);
                    }
                }
            }
            _ => {}
        }
    }
    out
}
