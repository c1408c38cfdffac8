//! Result types for query execution
//!
//! Mirrors the engine's response body:
//! `{ took, hits: { total, hits: [{ _id, _source, fields? }] }, aggregations? }`

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::execution::{ExecutionError, ExecutionResult};

/// A single document in the result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Document key
    #[serde(rename = "_id")]
    pub id: String,
    /// Relevance score, when the engine reports one
    #[serde(rename = "_score", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Stored document body
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,
    /// Requested stored fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Map<String, Value>>,
}

impl Hit {
    pub fn new(id: impl Into<String>, source: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            score: None,
            source,
            fields: None,
        }
    }
}

/// Hit list plus total match count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hits {
    /// Total matches, independent of page size
    #[serde(deserialize_with = "deserialize_total")]
    pub total: u64,
    /// The requested page of hits
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Engine response for one search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Engine-reported elapsed time in milliseconds
    pub took: u64,
    pub hits: Hits,
    /// Aggregation results keyed by aggregation name
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub aggregations: Map<String, Value>,
}

impl SearchResponse {
    /// Decodes a raw engine response body.
    pub fn from_value(body: Value) -> ExecutionResult<Self> {
        serde_json::from_value(body).map_err(|e| ExecutionError::MalformedResponse(e.to_string()))
    }

    /// Total number of matches
    pub fn total(&self) -> u64 {
        self.hits.total
    }

    /// Returns true if nothing matched
    pub fn is_empty(&self) -> bool {
        self.hits.total == 0
    }

    /// Buckets of a named terms aggregation (`{key, doc_count}` pairs).
    ///
    /// `path` walks through filter aggregations, e.g. `["myfavorites", "entries"]`.
    pub fn buckets(&self, path: &[&str]) -> Vec<Bucket> {
        let mut node = match path.first().and_then(|name| self.aggregations.get(*name)) {
            Some(v) => v,
            None => return Vec::new(),
        };
        for name in &path[1..] {
            node = match node.get(*name) {
                Some(v) => v,
                None => return Vec::new(),
            };
        }
        node.get("buckets")
            .cloned()
            .and_then(|b| serde_json::from_value(b).ok())
            .unwrap_or_default()
    }
}

/// A terms aggregation bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: Value,
    pub doc_count: u64,
}

/// Engines report totals either as a bare count or as `{"value": n, ...}`.
fn deserialize_total<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Total {
        Count(u64),
        Object { value: u64 },
    }

    Ok(match Total::deserialize(deserializer)? {
        Total::Count(n) => n,
        Total::Object { value } => value,
    })
}
