//! # Query execution interface
//!
//! The boundary between query construction and the search engine. Lookups
//! hand a [`SearchRequest`] to an implementation and get a
//! [`SearchResponse`] back. Errors from this boundary are propagated as-is;
//! nothing in this crate retries them.

use std::sync::Arc;
use thiserror::Error;

use super::ast::SearchRequest;
use super::response::SearchResponse;

/// Result type for execution operations
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Failures surfaced by an execution backend
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    /// The target collection or index does not exist
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// The engine rejected the request
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// The engine answered with something that is not a search response
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Connection-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend gave up waiting
    #[error("Query timed out after {0} ms")]
    Timeout(u64),
}

/// Runs structured queries against a named collection.
///
/// Calls are blocking. Timeouts, if any, belong to the implementation.
pub trait QueryExecution: Send + Sync {
    /// Executes `request` against `collection`.
    fn execute(&self, collection: &str, request: &SearchRequest) -> ExecutionResult<SearchResponse>;
}

impl<T: QueryExecution + ?Sized> QueryExecution for Arc<T> {
    fn execute(&self, collection: &str, request: &SearchRequest) -> ExecutionResult<SearchResponse> {
        (**self).execute(collection, request)
    }
}

impl<T: QueryExecution + ?Sized> QueryExecution for &T {
    fn execute(&self, collection: &str, request: &SearchRequest) -> ExecutionResult<SearchResponse> {
        (**self).execute(collection, request)
    }
}
