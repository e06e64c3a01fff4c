//! Field registry consumed by the interpreter.
//!
//! A query identifier such as `xp` or `trait` resolves to a
//! [`FieldDescriptor`]: a declared [`FieldType`] plus a lookup function
//! that reads the value from a card record. The registry is generic over
//! the card type `C` and an auxiliary lookup context `L` (locale, whether
//! to match card backs, ...) supplied once per interpreter.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// Declared type of a field.
///
/// The type selects comparison semantics: strict equality on `text`
/// fields matches substrings, on every other type it matches exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Text,
    Number,
    Boolean,
}

impl FieldType {
    pub fn name(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type FieldLookup<C, L> = Box<dyn Fn(&C, &L) -> FieldValue>;

/// A typed accessor over card records.
pub struct FieldDescriptor<C, L = ()> {
    pub field_type: FieldType,
    lookup: FieldLookup<C, L>,
}

impl<C, L> FieldDescriptor<C, L> {
    pub fn new(field_type: FieldType, lookup: impl Fn(&C, &L) -> FieldValue + 'static) -> Self {
        FieldDescriptor {
            field_type,
            lookup: Box::new(lookup),
        }
    }

    pub fn string(lookup: impl Fn(&C, &L) -> FieldValue + 'static) -> Self {
        Self::new(FieldType::String, lookup)
    }

    pub fn text(lookup: impl Fn(&C, &L) -> FieldValue + 'static) -> Self {
        Self::new(FieldType::Text, lookup)
    }

    pub fn number(lookup: impl Fn(&C, &L) -> FieldValue + 'static) -> Self {
        Self::new(FieldType::Number, lookup)
    }

    pub fn boolean(lookup: impl Fn(&C, &L) -> FieldValue + 'static) -> Self {
        Self::new(FieldType::Boolean, lookup)
    }

    pub fn lookup(&self, card: &C, context: &L) -> FieldValue {
        (self.lookup)(card, context)
    }
}

impl<C, L> fmt::Debug for FieldDescriptor<C, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("field_type", &self.field_type)
            .finish_non_exhaustive()
    }
}

/// Map from lowercase field name to descriptor.
pub struct FieldRegistry<C, L = ()> {
    fields: HashMap<String, FieldDescriptor<C, L>>,
}

impl<C, L> FieldRegistry<C, L> {
    pub fn new() -> Self {
        FieldRegistry {
            fields: HashMap::new(),
        }
    }

    /// Registers a field. Names are lowercased to match lexer output.
    pub fn insert(&mut self, name: &str, descriptor: FieldDescriptor<C, L>) {
        self.fields.insert(name.to_lowercase(), descriptor);
    }

    /// Builder form of [`FieldRegistry::insert`].
    pub fn with(mut self, name: &str, descriptor: FieldDescriptor<C, L>) -> Self {
        self.insert(name, descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor<C, L>> {
        self.fields.get(name)
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.get(name).map(|d| d.field_type)
    }

    /// Field names in alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<C, L> Default for FieldRegistry<C, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, L> fmt::Debug for FieldRegistry<C, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.names().into_iter().map(|n| (n, self.fields[n].field_type)))
            .finish()
    }
}

/// Everything an interpreter needs besides the query itself.
#[derive(Debug)]
pub struct InterpreterContext<C, L = ()> {
    pub fields: FieldRegistry<C, L>,
    pub field_lookup_context: L,
}

impl<C, L> InterpreterContext<C, L> {
    pub fn new(fields: FieldRegistry<C, L>, field_lookup_context: L) -> Self {
        InterpreterContext {
            fields,
            field_lookup_context,
        }
    }
}

impl<C> From<FieldRegistry<C, ()>> for InterpreterContext<C, ()> {
    fn from(fields: FieldRegistry<C, ()>) -> Self {
        InterpreterContext::new(fields, ())
    }
}
