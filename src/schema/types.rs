//! Field descriptor table
//!
//! A schema is an explicit, statically enumerated list of field descriptors.
//! Declaration order is preserved and is the order the validator reports in.

use serde_json::{Map, Value};

use super::constraints::Constraint;

/// Declaration of a single document field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Whether the field must be present in the input
    pub required: bool,
    /// Shape constraint
    pub constraint: Constraint,
    /// Whether coercion runs before the constraint is checked
    pub coercible: bool,
    /// Whether the field is derived and must never come from input
    pub derived: bool,
    /// Whether the field is set only by an internal step, never from input
    pub internal: bool,
}

impl FieldDescriptor {
    /// Create a required field
    pub fn required(name: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            name: name.into(),
            required: true,
            constraint,
            coercible: false,
            derived: false,
            internal: false,
        }
    }

    /// Create an optional field
    pub fn optional(name: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            name: name.into(),
            required: false,
            constraint,
            coercible: false,
            derived: false,
            internal: false,
        }
    }

    /// Create a derived field, computed by the document itself
    pub fn derived(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            constraint: Constraint::Str,
            coercible: false,
            derived: true,
            internal: false,
        }
    }

    /// Create a field that only an internal step may set
    pub fn internal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            constraint: Constraint::Str,
            coercible: false,
            derived: false,
            internal: true,
        }
    }

    /// Marks the field as coercible
    pub fn coerce(mut self) -> Self {
        self.coercible = true;
        self
    }
}

/// Complete schema definition for one document type.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Document type name
    pub name: String,
    /// Field descriptors in declaration order
    pub fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// Create a new schema
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Looks up a field descriptor by name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of the required fields, in declaration order
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
    }

    /// Applies every coercible field's coercion to `input`, in place.
    ///
    /// Absent fields are left absent.
    pub fn coerce(&self, input: &mut Map<String, Value>) {
        for field in self.fields.iter().filter(|f| f.coercible) {
            if let Some(value) = input.remove(&field.name) {
                input.insert(field.name.clone(), field.constraint.coerce(value));
            }
        }
    }
}
