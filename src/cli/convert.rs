//! JSON -> FieldValue conversion utilities

use serde_json::Value;

use crate::{FieldType, FieldValue};

/// Convert a JSON value read from a card into a field value.
///
/// Objects carry no comparable value and become null.
pub fn json_to_field_value(v: &Value) -> FieldValue {
    match v {
        Value::Null | Value::Object(_) => FieldValue::Null,
        Value::Bool(b) => FieldValue::Boolean(*b),
        Value::Number(n) => n.as_f64().map_or(FieldValue::Null, FieldValue::Number),
        Value::String(s) => FieldValue::String(s.clone()),
        Value::Array(items) => FieldValue::Array(items.iter().map(json_to_field_value).collect()),
    }
}

/// Guess the field type of a JSON value; arrays use their first non-null
/// element. `None` when nothing can be inferred.
pub fn infer_field_type(v: &Value) -> Option<FieldType> {
    match v {
        Value::Bool(_) => Some(FieldType::Boolean),
        Value::Number(_) => Some(FieldType::Number),
        Value::String(_) => Some(FieldType::String),
        Value::Array(items) => items.iter().find_map(infer_field_type),
        Value::Null | Value::Object(_) => None,
    }
}
