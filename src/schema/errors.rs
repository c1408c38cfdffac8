//! Validation failure types
//!
//! Violations are returned, never raised. The caller decides whether to
//! reject the input or proceed.

use serde::Serialize;
use std::fmt;

/// A single field-level violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Field name (top-level declared field)
    pub field: String,
    /// Human-readable description of the first failure for this field
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// A required field is absent
    pub fn missing_field(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("{} is required", field);
        Self { field, message }
    }

    /// A derived field was supplied by the caller
    pub fn derived_field(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("{} is derived and cannot be supplied", field);
        Self { field, message }
    }

    /// A field reserved for an internal step was supplied by the caller
    pub fn internal_field(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("{} is set internally and cannot be supplied", field);
        Self { field, message }
    }

    /// Input was not an object at all
    pub fn not_an_object() -> Self {
        Self::new("$root", "document must be an object")
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': {}", self.field, self.message)
    }
}
