//! Query/Lookup sets
//!
//! Translate read requests into structured queries, run them through the
//! execution interface, and normalise the hits into plain maps ready to be
//! serialised as a response body.
//!
//! # Result policy
//!
//! - Matches: a map such as `{authors: [...], took, total}`
//! - Zero total hits: an empty map (no content, not an error)
//! - Execution failure: `LookupError::Execution`, never retried

mod author;
mod errors;
mod favorite;

pub use author::AuthorQuery;
pub use errors::{LookupError, LookupResult};
pub use favorite::FavoriteQuery;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::query::{QueryExecution, SearchRequest, SearchResponse};

/// Response body handed to the rendering layer
pub type ResultMap = Map<String, Value>;

/// One identifier or a sequence of identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Flattens into a sequence, promoting a single value
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

impl From<&str> for OneOrMany {
    fn from(s: &str) -> Self {
        OneOrMany::One(s.to_string())
    }
}

impl From<String> for OneOrMany {
    fn from(s: String) -> Self {
        OneOrMany::One(s)
    }
}

impl<S: Into<String>> From<Vec<S>> for OneOrMany {
    fn from(v: Vec<S>) -> Self {
        OneOrMany::Many(v.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for OneOrMany {
    fn from(v: [S; N]) -> Self {
        OneOrMany::Many(v.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String> + Clone> From<&[S]> for OneOrMany {
    fn from(v: &[S]) -> Self {
        OneOrMany::Many(v.iter().cloned().map(Into::into).collect())
    }
}

/// Runs `request`, logging the body and any failure before propagating it.
fn run(
    executor: &dyn QueryExecution,
    collection: &str,
    request: &SearchRequest,
) -> LookupResult<SearchResponse> {
    debug!(collection, body = %request.to_value(), "executing query");

    let response = executor.execute(collection, request).map_err(|e| {
        warn!(collection, error = %e, "query execution failed");
        LookupError::from(e)
    })?;

    debug!(
        collection,
        total = response.total(),
        returned = response.hits.hits.len(),
        took = response.took,
        "query complete"
    );
    Ok(response)
}
