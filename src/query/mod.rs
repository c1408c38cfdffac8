//! Query subsystem
//!
//! Typed request/response model for the search engine, the execution
//! interface that sits in front of it, and result normalisation.
//!
//! # Design Principles
//!
//! - Requests are data; building one has no side effects
//! - The execution interface is the only place I/O happens
//! - Execution failures propagate unmodified

mod ast;
mod execution;
mod flatten;
mod response;

pub use ast::{
    Aggregation, BoolQuery, Operator, Query, SearchRequest, SortDirection, SortSpec,
};
pub use execution::{ExecutionError, ExecutionResult, QueryExecution};
pub use flatten::single_valued_to_scalar;
pub use response::{Bucket, Hit, Hits, SearchResponse};
