//! In-memory execution backend
//!
//! Holds documents per collection and evaluates [`SearchRequest`]s against
//! them with the same request/response shapes the search engine uses.
//!
//! Execution flow (strict order):
//! 1. Reject requests whose result window is too large
//! 2. Resolve the collection
//! 3. Score every document against the query
//! 4. Compute aggregations over all matches
//! 5. Sort (explicit specs, else score)
//! 6. Apply `from`/`size` and `_source` filtering

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::RwLock;
use std::time::Instant;
use tracing::debug;

use super::aggregate;
use super::matcher::QueryMatcher;
use super::sorter::ResultSorter;
use crate::document::{Author, DocumentResult};
use crate::query::{
    ExecutionError, ExecutionResult, Hit, Hits, QueryExecution, SearchRequest, SearchResponse,
};

/// Largest `from + size` a request may ask for
pub const MAX_RESULT_WINDOW: u64 = 10_000;

/// A stored document body and its key
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub source: Map<String, Value>,
}

/// A matching document and its relevance score
#[derive(Debug, Clone)]
pub struct ScoredDocument<'a> {
    pub score: f64,
    pub doc: &'a StoredDocument,
}

/// Document collections held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, Vec<StoredDocument>>>,
}

impl MemoryStore {
    /// Creates an empty store with no collections
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with the given empty collections
    pub fn with_collections<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        for name in names {
            store.create_collection(name);
        }
        store
    }

    /// Creates a collection if it does not exist yet
    pub fn create_collection(&self, name: impl Into<String>) {
        self.write_collections().entry(name.into()).or_default();
    }

    /// Stores `source` under `id`, replacing any document with the same key.
    ///
    /// The collection is created on first use.
    pub fn insert(&self, collection: &str, id: impl Into<String>, source: Map<String, Value>) {
        let id = id.into();
        let mut collections = self.write_collections();
        let docs = collections.entry(collection.to_string()).or_default();

        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => existing.source = source,
            None => docs.push(StoredDocument { id, source }),
        }
    }

    /// Stores an author under its PAUSE id.
    pub fn insert_author(&self, collection: &str, author: &Author) -> DocumentResult<()> {
        let source = author.to_document()?;
        self.insert(collection, author.pauseid(), source);
        Ok(())
    }

    /// Number of documents in a collection (0 if it does not exist)
    pub fn len(&self, collection: &str) -> usize {
        self.read_collections()
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Returns true if the collection is absent or empty
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn read_collections(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Vec<StoredDocument>>> {
        // A panic while holding the lock cannot leave a half-written document.
        self.collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_collections(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, Vec<StoredDocument>>> {
        self.collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl QueryExecution for MemoryStore {
    fn execute(&self, collection: &str, request: &SearchRequest) -> ExecutionResult<SearchResponse> {
        let started = Instant::now();

        // Step 1: bounded result window
        let window = request.from.saturating_add(request.size);
        if window > MAX_RESULT_WINDOW {
            return Err(ExecutionError::MalformedQuery(format!(
                "result window {} exceeds {}",
                window, MAX_RESULT_WINDOW
            )));
        }

        // Step 2: resolve collection
        let collections = self.read_collections();
        let docs = collections
            .get(collection)
            .ok_or_else(|| ExecutionError::CollectionNotFound(collection.to_string()))?;

        // Step 3: score
        let mut matched: Vec<ScoredDocument<'_>> = docs
            .iter()
            .filter_map(|doc| {
                QueryMatcher::score(&request.query, &doc.id, &doc.source)
                    .map(|score| ScoredDocument { score, doc })
            })
            .collect();
        let total = matched.len() as u64;

        // Step 4: aggregations see every match, not just the page
        let aggregations = if request.aggregations.is_empty() {
            Map::new()
        } else {
            let all: Vec<&StoredDocument> = matched.iter().map(|m| m.doc).collect();
            aggregate::evaluate(&request.aggregations, &all)
        };

        // Step 5: sort
        ResultSorter::sort(&mut matched, &request.sort);

        // Step 6: page and project
        let hits: Vec<Hit> = matched
            .into_iter()
            .skip(request.from as usize)
            .take(request.size as usize)
            .map(|m| Hit {
                id: m.doc.id.clone(),
                score: Some(m.score),
                source: project(&m.doc.source, request.source.as_deref()),
                fields: None,
            })
            .collect();

        let took = started.elapsed().as_millis() as u64;
        debug!(collection, total, returned = hits.len(), took, "memory store query");

        Ok(SearchResponse {
            took,
            hits: Hits { total, hits },
            aggregations,
        })
    }
}

fn project(source: &Map<String, Value>, fields: Option<&[String]>) -> Map<String, Value> {
    match fields {
        None => source.clone(),
        Some(fields) => source
            .iter()
            .filter(|(k, _)| fields.iter().any(|f| f == *k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Query, SortSpec};
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        for (i, dist) in ["Moose", "Dancer", "Catalyst"].iter().enumerate() {
            store.insert(
                "favorite",
                format!("f{}", i),
                obj(json!({"user": "abc", "distribution": dist, "date": format!("2020-0{}-01T00:00:00", i + 1)})),
            );
        }
        store
    }

    #[test]
    fn test_unknown_collection() {
        let err = store()
            .execute("nope", &SearchRequest::new(Query::MatchAll))
            .unwrap_err();
        assert!(matches!(err, ExecutionError::CollectionNotFound(name) if name == "nope"));
    }

    #[test]
    fn test_empty_collection_returns_zero_total() {
        let store = MemoryStore::with_collections(["author"]);
        let resp = store
            .execute("author", &SearchRequest::new(Query::MatchAll))
            .unwrap();
        assert!(resp.is_empty());
        assert!(resp.hits.hits.is_empty());
    }

    #[test]
    fn test_insert_replaces_same_key() {
        let store = store();
        store.insert("favorite", "f0", obj(json!({"user": "xyz", "distribution": "Moose"})));
        assert_eq!(store.len("favorite"), 3);
    }

    #[test]
    fn test_paging_and_total() {
        let req = SearchRequest::new(Query::MatchAll)
            .with_sort(SortSpec::desc("date"))
            .with_from(1)
            .with_size(1);
        let resp = store().execute("favorite", &req).unwrap();
        assert_eq!(resp.total(), 3);
        assert_eq!(resp.hits.hits.len(), 1);
        assert_eq!(resp.hits.hits[0].id, "f1");
    }

    #[test]
    fn test_source_projection() {
        let req = SearchRequest::new(Query::term("distribution", "Moose")).with_source(["user"]);
        let resp = store().execute("favorite", &req).unwrap();
        assert_eq!(resp.hits.hits[0].source, obj(json!({"user": "abc"})));
    }

    #[test]
    fn test_result_window_bounded() {
        let req = SearchRequest::new(Query::MatchAll).with_from(9_995).with_size(10);
        let err = store().execute("favorite", &req).unwrap_err();
        assert!(matches!(err, ExecutionError::MalformedQuery(_)));
    }

    #[test]
    fn test_insert_author_uses_pauseid_key() {
        let store = MemoryStore::new();
        let author = Author::from_import(json!({
            "pauseid": "PERLER",
            "name": "Perl Hacker",
            "email": "perler@example.com",
            "website": []
        }))
        .unwrap();
        store.insert_author("author", &author).unwrap();

        let resp = store
            .execute("author", &SearchRequest::new(Query::ids(["PERLER"])))
            .unwrap();
        assert_eq!(resp.total(), 1);
        assert_eq!(resp.hits.hits[0].source["gravatar_url"], json!(author.gravatar_url()));
    }
}
