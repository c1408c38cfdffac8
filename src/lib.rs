//! cpanmeta - CPAN author and favorite metadata
//!
//! Document schemas with import-time coercion, a field validator, and the
//! read-side lookup sets that turn requests into structured search queries.

pub mod config;
pub mod document;
pub mod lookup;
pub mod query;
pub mod schema;
pub mod store;
