//! # Document Errors
//!
//! Error types for building typed documents from untyped input.

use thiserror::Error;

/// Result type for document construction
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Document construction errors
///
/// Missing required fields are not construction errors; they are reported
/// by the validator.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Input was not a JSON object
    #[error("Document must be an object, got {0}")]
    NotAnObject(&'static str),

    /// A field survived coercion with a shape the typed record cannot hold
    #[error("Document decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
