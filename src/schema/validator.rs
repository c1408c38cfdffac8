//! Schema validator for inbound documents
//!
//! Validation semantics:
//! - Every declared field is visited in declaration order
//! - A required field that is absent yields "<field> is required"
//! - A present field is coerced (when coercible) and then checked
//! - One violation per field; the first constraint failure wins
//! - Fields neither required nor present are skipped
//! - An explicit `null` counts as absent
//! - Derived and internal fields must not be supplied at all
//!
//! The validator does not mutate its input and performs no I/O.

use serde_json::{Map, Value};
use tracing::debug;

use super::errors::Violation;
use super::types::{FieldDescriptor, Schema};

/// Validates untyped input maps against a schema.
pub struct SchemaValidator<'a> {
    schema: &'a Schema,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a new validator for the given schema.
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Validates `input`, returning every field-level violation.
    ///
    /// An empty vector means the input is fully valid.
    pub fn validate(&self, input: &Value) -> Vec<Violation> {
        let violations = match input.as_object() {
            Some(obj) => self.validate_map(obj),
            None => vec![Violation::not_an_object()],
        };

        debug!(
            schema = %self.schema.name,
            violations = violations.len(),
            "validated document"
        );
        violations
    }

    /// Validates an already-unwrapped object.
    pub fn validate_map(&self, input: &Map<String, Value>) -> Vec<Violation> {
        self.schema
            .fields
            .iter()
            .filter_map(|field| Self::validate_field(field, input))
            .collect()
    }

    fn validate_field(field: &FieldDescriptor, input: &Map<String, Value>) -> Option<Violation> {
        let raw = match input.get(&field.name).filter(|v| !v.is_null()) {
            Some(v) => v,
            None if field.required => return Some(Violation::missing_field(&field.name)),
            None => return None,
        };

        if field.derived {
            return Some(Violation::derived_field(&field.name));
        }
        if field.internal {
            return Some(Violation::internal_field(&field.name));
        }

        let result = if field.coercible {
            let coerced = field.constraint.coerce(raw.clone());
            field.constraint.check(&field.name, &coerced)
        } else {
            field.constraint.check(&field.name, raw)
        };

        result
            .err()
            .map(|message| Violation::new(&field.name, message))
    }
}

/// Validates `input` against `schema`.
pub fn validate(schema: &Schema, input: &Value) -> Vec<Violation> {
    SchemaValidator::new(schema).validate(input)
}
