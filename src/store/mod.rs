//! In-memory document store
//!
//! A [`QueryExecution`](crate::query::QueryExecution) backend that keeps
//! documents in process. It evaluates the same structured requests the
//! lookup sets send to the search engine, which makes it suitable for
//! tests, fixtures and small embedded deployments.

mod aggregate;
mod matcher;
mod memory;
mod sorter;

pub use matcher::{analyze, QueryMatcher, ANALYZED_SUFFIX};
pub use memory::{MemoryStore, ScoredDocument, StoredDocument, MAX_RESULT_WINDOW};
pub use sorter::ResultSorter;
