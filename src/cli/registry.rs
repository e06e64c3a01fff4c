//! Field registry over JSON card objects

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{CliError, convert::{infer_field_type, json_to_field_value}};
use crate::{FieldDescriptor, FieldRegistry, FieldType, FieldValue};

/// Lookup context for JSON cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupContext {
    /// Also match the back of double-sided cards
    pub match_backs: bool,
}

/// How to read one field from a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Dotted path into the card; defaults to the field name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Dotted path to the value on the card back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_path: Option<String>,
}

impl FieldSpec {
    pub fn new(field_type: FieldType) -> Self {
        FieldSpec {
            field_type,
            path: None,
            back_path: None,
        }
    }
}

/// Field name -> lookup settings, as read from a `--fields` file.
///
/// ```json
/// {
///   "xp": { "type": "number" },
///   "trait": { "type": "text", "path": "traits", "back_path": "back.traits" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSchema {
    pub fields: BTreeMap<String, FieldSpec>,
}

impl FieldSchema {
    pub fn from_json(json: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Infers one field per top-level card key. The first card with a
    /// non-null value for a key decides its type.
    pub fn infer(cards: &[Value]) -> Self {
        let mut fields = BTreeMap::new();
        for card in cards {
            let Value::Object(map) = card else { continue };
            for (key, value) in map {
                let name = key.to_lowercase();
                if fields.contains_key(&name) {
                    continue;
                }
                if let Some(field_type) = infer_field_type(value) {
                    let mut spec = FieldSpec::new(field_type);
                    if name != *key {
                        spec.path = Some(key.clone());
                    }
                    fields.insert(name, spec);
                }
            }
        }
        debug!(fields = fields.len(), "inferred field schema");
        FieldSchema { fields }
    }

    /// Builds the registry the interpreter reads cards through.
    pub fn registry(&self) -> FieldRegistry<Value, LookupContext> {
        let mut registry = FieldRegistry::new();
        for (name, spec) in &self.fields {
            let path = split_path(spec.path.as_deref().unwrap_or(name));
            let back_path = spec.back_path.as_deref().map(split_path);

            registry.insert(
                name,
                FieldDescriptor::new(spec.field_type, move |card: &Value, ctx: &LookupContext| {
                    let front = resolve(card, &path).map_or(FieldValue::Null, json_to_field_value);

                    if ctx.match_backs
                        && let Some(back_path) = &back_path
                        && let Some(back) = resolve(card, back_path)
                        && !back.is_null()
                    {
                        return FieldValue::Array(vec![front, json_to_field_value(back)]);
                    }

                    front
                }),
            );
        }
        registry
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('.').map(str::to_string).collect()
}

fn resolve<'v>(card: &'v Value, path: &[String]) -> Option<&'v Value> {
    path.iter().try_fold(card, |current, key| current.get(key))
}
