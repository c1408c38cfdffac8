//! Schema subsystem
//!
//! Field-level type constraints, an explicit descriptor table per document
//! type, and a validator that turns untyped input into a list of
//! violations.
//!
//! # Design Principles
//!
//! - Descriptor tables are built once and iterated, never reflected
//! - Coercion runs before checking for coercible fields
//! - Validation returns violations instead of failing
//! - Deterministic output (declaration order)

mod constraints;
mod errors;
mod types;
mod validator;

pub use constraints::{Constraint, DictField};
pub use errors::Violation;
pub use types::{FieldDescriptor, Schema};
pub use validator::{validate, SchemaValidator};
