//! Author lookups: by linked user, by PAUSE id, and free-text search.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::errors::LookupResult;
use super::{run, OneOrMany, ResultMap};
use crate::config::LookupConfig;
use crate::query::{
    single_valued_to_scalar, BoolQuery, Hit, Operator, Query, QueryExecution, SearchRequest,
};

/// Read operations over the author collection.
#[derive(Clone)]
pub struct AuthorQuery {
    executor: Arc<dyn QueryExecution>,
    config: LookupConfig,
}

impl AuthorQuery {
    /// Creates a lookup set over `executor`.
    pub fn new(executor: Arc<dyn QueryExecution>, config: LookupConfig) -> Self {
        Self { executor, config }
    }

    /// The active configuration
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Builds the "any of these users" request.
    pub fn by_user_request(&self, users: Vec<String>) -> SearchRequest {
        SearchRequest::new(Query::terms("user", users)).with_size(self.config.by_user_size)
    }

    /// Authors linked to one or more users.
    ///
    /// Returns `{authors: [...]}`, or an empty map when nobody matches.
    #[instrument(skip_all, fields(collection = %self.config.author_collection))]
    pub fn by_user(&self, users: impl Into<OneOrMany>) -> LookupResult<ResultMap> {
        let users = users.into().into_vec();
        if users.is_empty() {
            return Ok(ResultMap::new());
        }

        let request = self.by_user_request(users);
        let response = run(&*self.executor, &self.config.author_collection, &request)?;
        if response.is_empty() {
            debug!("no authors for users");
            return Ok(ResultMap::new());
        }

        let authors: Vec<Value> = response
            .hits
            .hits
            .into_iter()
            .map(|hit| Value::Object(flattened_source(hit, false)))
            .collect();

        let mut result = ResultMap::new();
        result.insert("authors".to_string(), Value::Array(authors));
        Ok(result)
    }

    /// Builds the four-clause relevance search request.
    ///
    /// Any one clause may match:
    /// 1. analyzed `name`, all terms required
    /// 2. analyzed `asciiname`, all terms required
    /// 3. exact `pauseid`, query uppercased
    /// 4. exact nested `profile.id`, query lowercased
    pub fn search_request(&self, query: &str, offset: Option<u64>) -> SearchRequest {
        let boosts = &self.config.boosts;
        let clauses = BoolQuery::new()
            .should(Query::matches("name.analyzed", query, Operator::And).with_boost(boosts.name))
            .should(
                Query::matches("asciiname.analyzed", query, Operator::And)
                    .with_boost(boosts.asciiname),
            )
            .should(Query::term("pauseid", query.to_uppercase()).with_boost(boosts.pauseid))
            .should(
                Query::nested("profile", Query::term("profile.id", query.to_lowercase()))
                    .with_boost(boosts.profile),
            );

        SearchRequest::new(clauses)
            .with_size(self.config.search_page_size)
            .with_from(offset.unwrap_or(0))
    }

    /// Free-text author search.
    ///
    /// Returns `{authors, took, total}`; each author carries its document
    /// key as `id`. Empty map when nothing matches.
    #[instrument(skip(self), fields(collection = %self.config.author_collection))]
    pub fn search(&self, query: &str, offset: Option<u64>) -> LookupResult<ResultMap> {
        let request = self.search_request(query, offset);
        let response = run(&*self.executor, &self.config.author_collection, &request)?;
        if response.is_empty() {
            debug!("no authors match");
            return Ok(ResultMap::new());
        }

        let took = response.took;
        let total = response.total();
        let authors: Vec<Value> = response
            .hits
            .hits
            .into_iter()
            .map(|hit| Value::Object(flattened_source(hit, true)))
            .collect();

        let mut result = ResultMap::new();
        result.insert("authors".to_string(), Value::Array(authors));
        result.insert("took".to_string(), json!(took));
        result.insert("total".to_string(), json!(total));
        Ok(result)
    }

    /// Authors by PAUSE id (document key).
    ///
    /// Returns `{authors, took, total}`, or an empty map when none exist.
    #[instrument(skip_all, fields(collection = %self.config.author_collection))]
    pub fn by_ids(&self, pauseids: impl Into<OneOrMany>) -> LookupResult<ResultMap> {
        let ids: Vec<String> = pauseids
            .into()
            .into_vec()
            .into_iter()
            .map(|id| id.to_uppercase())
            .collect();
        if ids.is_empty() {
            return Ok(ResultMap::new());
        }

        let size = ids.len() as u64;
        let request = SearchRequest::new(Query::ids(ids)).with_size(size);
        let response = run(&*self.executor, &self.config.author_collection, &request)?;
        if response.is_empty() {
            return Ok(ResultMap::new());
        }

        let took = response.took;
        let total = response.total();
        let authors: Vec<Value> = response
            .hits
            .hits
            .into_iter()
            .map(|hit| Value::Object(flattened_source(hit, false)))
            .collect();

        let mut result = ResultMap::new();
        result.insert("authors".to_string(), Value::Array(authors));
        result.insert("took".to_string(), json!(took));
        result.insert("total".to_string(), json!(total));
        Ok(result)
    }
}

/// `_source` of a hit, optionally with the document key added as `id`,
/// with single-valued arrays flattened.
fn flattened_source(hit: Hit, with_id: bool) -> ResultMap {
    let mut doc = hit.source;
    if with_id {
        doc.insert("id".to_string(), Value::String(hit.id));
    }
    single_valued_to_scalar(&mut doc);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn lookup() -> AuthorQuery {
        AuthorQuery::new(Arc::new(MemoryStore::new()), LookupConfig::default())
    }

    #[test]
    fn test_search_request_shape() {
        let body = lookup().search_request("Perl Hacker", Some(25)).to_value();

        assert_eq!(body["size"], 10);
        assert_eq!(body["from"], 25);

        let should = body["query"]["bool"]["should"].as_array().unwrap();
        assert_eq!(should.len(), 4);
        assert_eq!(
            should[0],
            json!({"match": {"name.analyzed": {"query": "Perl Hacker", "operator": "and"}}})
        );
        assert_eq!(
            should[1],
            json!({"match": {"asciiname.analyzed": {"query": "Perl Hacker", "operator": "and"}}})
        );
        assert_eq!(should[2], json!({"term": {"pauseid": "PERL HACKER"}}));
        assert_eq!(
            should[3],
            json!({"nested": {"path": "profile", "query": {"term": {"profile.id": "perl hacker"}}}})
        );
    }

    #[test]
    fn test_search_offset_defaults_to_zero() {
        let body = lookup().search_request("x", None).to_value();
        assert_eq!(body["from"], 0);
    }

    #[test]
    fn test_search_boosts_from_config() {
        let mut config = LookupConfig::default();
        config.boosts.pauseid = 4.0;
        let q = AuthorQuery::new(Arc::new(MemoryStore::new()), config);
        let body = q.search_request("perler", None).to_value();
        assert_eq!(
            body["query"]["bool"]["should"][2],
            json!({"term": {"pauseid": {"value": "PERLER", "boost": 4.0}}})
        );
    }

    #[test]
    fn test_by_user_request_shape() {
        let body = lookup()
            .by_user_request(vec!["alice".into(), "bob".into()])
            .to_value();
        assert_eq!(body["query"], json!({"terms": {"user": ["alice", "bob"]}}));
        assert_eq!(body["size"], 100);
    }

    #[test]
    fn test_empty_user_list_skips_store() {
        let result = lookup().by_user(Vec::<String>::new()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_flattened_source_adds_id() {
        let source = json!({"email": ["a@b.c"], "name": "A"})
            .as_object()
            .cloned()
            .unwrap();
        let doc = flattened_source(Hit::new("KEY", source), true);
        assert_eq!(doc["id"], "KEY");
        assert_eq!(doc["email"], "a@b.c");
    }
}
