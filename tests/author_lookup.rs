//! Author Lookup Tests
//!
//! End-to-end behavior of the author lookup set over the in-memory store:
//! - by_user returns linked authors or an empty map
//! - search matches on name, asciiname, PAUSE id or profile id
//! - search pages with a fixed size and caller offset
//! - execution failures propagate unchanged

use cpanmeta::config::LookupConfig;
use cpanmeta::document::Author;
use cpanmeta::lookup::{AuthorQuery, LookupError};
use cpanmeta::query::{ExecutionError, ExecutionResult, QueryExecution, SearchRequest, SearchResponse};
use cpanmeta::store::MemoryStore;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

// =============================================================================
// Helper Functions
// =============================================================================

fn author(pauseid: &str, name: &str, user: Option<&str>) -> Author {
    let mut author = Author::from_import(json!({
        "pauseid": pauseid,
        "name": name,
        "asciiname": name,
        "website": [format!("https://{}.example", pauseid.to_lowercase())],
        "email": format!("{}@example.com", pauseid.to_lowercase()),
        "profile": [{"name": "github", "id": format!("{}-gh", pauseid.to_lowercase())}]
    }))
    .unwrap();
    if let Some(user) = user {
        author.link_user(user);
    }
    author
}

fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::with_collections(["author"]);
    for a in [
        author("PERLER", "Perl Hacker", Some("alice")),
        author("MONGER", "Perl Monger", Some("bob")),
        author("RUSTY", "Rusty Crab", None),
    ] {
        store.insert_author("author", &a).unwrap();
    }
    Arc::new(store)
}

fn lookup(store: Arc<MemoryStore>) -> AuthorQuery {
    AuthorQuery::new(store, LookupConfig::default())
}

fn pauseids(result: &serde_json::Map<String, Value>) -> Vec<String> {
    let mut ids: Vec<String> = result["authors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["pauseid"].as_str().unwrap().to_string())
        .collect();
    ids.sort();
    ids
}

/// Records requests and answers with a fixed outcome.
struct RecordingExecutor {
    requests: Mutex<Vec<(String, Value)>>,
    outcome: ExecutionResult<SearchResponse>,
}

impl RecordingExecutor {
    fn answering(outcome: ExecutionResult<SearchResponse>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            outcome,
        })
    }
}

impl QueryExecution for RecordingExecutor {
    fn execute(&self, collection: &str, request: &SearchRequest) -> ExecutionResult<SearchResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((collection.to_string(), request.to_value()));
        self.outcome.clone()
    }
}

fn empty_response() -> SearchResponse {
    SearchResponse::from_value(json!({"took": 1, "hits": {"total": 0, "hits": []}})).unwrap()
}

// =============================================================================
// By User Tests
// =============================================================================

/// A single linked user returns that user's author.
#[test]
fn test_by_user_single() {
    let result = lookup(seeded_store()).by_user("alice").unwrap();
    assert_eq!(pauseids(&result), vec!["PERLER"]);
    assert_eq!(result.len(), 1);
}

/// Several users return every linked author.
#[test]
fn test_by_user_many() {
    let result = lookup(seeded_store())
        .by_user(vec!["alice", "bob", "carol"])
        .unwrap();
    assert_eq!(pauseids(&result), vec!["MONGER", "PERLER"]);
}

/// An unknown user yields an empty map, not an error.
#[test]
fn test_by_user_no_match_is_empty() {
    let result = lookup(seeded_store()).by_user("nobody").unwrap();
    assert!(result.is_empty());
}

/// Single-valued arrays come back as scalars.
#[test]
fn test_by_user_flattens_single_values() {
    let result = lookup(seeded_store()).by_user("alice").unwrap();
    let author = &result["authors"][0];
    assert_eq!(author["email"], "perler@example.com");
    assert_eq!(author["user"], "alice");
    assert!(author["gravatar_url"]
        .as_str()
        .unwrap()
        .starts_with("https://www.gravatar.com/avatar/"));
}

// =============================================================================
// Search Tests
// =============================================================================

/// A PAUSE id query matches case-insensitively via the exact clause.
#[test]
fn test_search_by_pauseid() {
    let result = lookup(seeded_store()).search("perler", Some(0)).unwrap();
    assert_eq!(pauseids(&result), vec!["PERLER"]);
    assert_eq!(result["total"], 1);
    assert_eq!(result["authors"][0]["id"], "PERLER");
    assert!(result.contains_key("took"));
}

/// Name queries require every term.
#[test]
fn test_search_by_name_requires_all_terms() {
    let q = lookup(seeded_store());
    assert_eq!(pauseids(&q.search("Perl Hacker", None).unwrap()), vec!["PERLER"]);
    assert_eq!(
        pauseids(&q.search("perl", None).unwrap()),
        vec!["MONGER", "PERLER"]
    );
}

/// Profile ids match through the nested clause, lowercased.
#[test]
fn test_search_by_profile_id() {
    let result = lookup(seeded_store()).search("RUSTY-GH", None).unwrap();
    assert_eq!(pauseids(&result), vec!["RUSTY"]);
}

/// No match yields an empty map.
#[test]
fn test_search_no_match_is_empty() {
    let result = lookup(seeded_store()).search("python", None).unwrap();
    assert!(result.is_empty());
}

/// The offset is passed through with the fixed page size.
#[test]
fn test_search_offset_and_page_size() {
    let executor = RecordingExecutor::answering(Ok(empty_response()));
    let q = AuthorQuery::new(executor.clone(), LookupConfig::default());

    let result = q.search("perler", Some(25)).unwrap();
    assert!(result.is_empty());

    let requests = executor.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (collection, body) = &requests[0];
    assert_eq!(collection, "author");
    assert_eq!(body["from"], 25);
    assert_eq!(body["size"], 10);
    assert_eq!(body["query"]["bool"]["should"].as_array().unwrap().len(), 4);
}

/// Offset past the last match returns the total but no authors.
#[test]
fn test_search_offset_past_end() {
    let result = lookup(seeded_store()).search("perl", Some(10)).unwrap();
    assert_eq!(result["total"], 2);
    assert!(result["authors"].as_array().unwrap().is_empty());
}

// =============================================================================
// By Id Tests
// =============================================================================

/// Ids are uppercased before lookup.
#[test]
fn test_by_ids() {
    let result = lookup(seeded_store())
        .by_ids(vec!["perler", "RUSTY", "GHOST"])
        .unwrap();
    assert_eq!(pauseids(&result), vec!["PERLER", "RUSTY"]);
    assert_eq!(result["total"], 2);
}

// =============================================================================
// Failure Propagation Tests
// =============================================================================

/// Executor errors surface unchanged and are not retried.
#[test]
fn test_execution_failure_propagates() {
    let executor =
        RecordingExecutor::answering(Err(ExecutionError::Transport("connection refused".into())));
    let q = AuthorQuery::new(executor.clone(), LookupConfig::default());

    let err = q.search("perler", None).unwrap_err();
    assert!(err.is_execution());
    assert!(matches!(
        err,
        LookupError::Execution(ExecutionError::Transport(ref msg)) if msg == "connection refused"
    ));
    assert_eq!(executor.requests.lock().unwrap().len(), 1);

    let err = q.by_user("alice").unwrap_err();
    assert_eq!(err.to_string(), "Transport error: connection refused");
}

/// A missing collection is an error, distinct from zero hits.
#[test]
fn test_missing_collection_is_an_error() {
    let q = lookup(Arc::new(MemoryStore::new()));
    let err = q.by_user("alice").unwrap_err();
    assert!(matches!(
        err,
        LookupError::Execution(ExecutionError::CollectionNotFound(_))
    ));
}
