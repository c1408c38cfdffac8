//! # Lookup Errors
//!
//! An empty result is not an error; it is an empty map.

use thiserror::Error;

use crate::query::ExecutionError;

/// Result type for lookup operations
pub type LookupResult<T> = Result<T, LookupError>;

/// Lookup failures
#[derive(Debug, Error)]
pub enum LookupError {
    /// The execution interface failed; propagated unmodified
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// A stored document could not be read as its typed record
    #[error("Stored document '{id}' is unreadable: {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LookupError {
    /// Returns true when the failure came from the execution interface
    pub fn is_execution(&self) -> bool {
        matches!(self, LookupError::Execution(_))
    }
}
