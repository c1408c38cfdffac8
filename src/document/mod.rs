//! Typed documents
//!
//! The Author record and its descriptor table, the lazily derived avatar
//! URL, and the read-only Favorite projection.

mod author;
mod errors;
mod favorite;
pub mod gravatar;

pub use author::{
    author_schema, validate_author, Author, Donation, Profile, GRAVATAR_URL_FIELD,
};
pub use errors::{DocumentError, DocumentResult};
pub use favorite::{favorite_schema, validate_favorite, Favorite};
