//! Favorite lookups: per user, per distribution, recent activity and the
//! leaderboard.

use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::errors::{LookupError, LookupResult};
use super::{run, OneOrMany, ResultMap};
use crate::config::LookupConfig;
use crate::document::Favorite;
use crate::query::{
    Aggregation, BoolQuery, Query, QueryExecution, SearchRequest, SortSpec,
};

const LEADERBOARD_AGG: &str = "leaderboard";
const FAVORITES_AGG: &str = "favorites";
const MY_FAVORITES_AGG: &str = "myfavorites";
const ENTRIES_AGG: &str = "entries";

/// Read operations over the favorite collection.
#[derive(Clone)]
pub struct FavoriteQuery {
    executor: Arc<dyn QueryExecution>,
    config: LookupConfig,
}

impl FavoriteQuery {
    /// Creates a lookup set over `executor`.
    pub fn new(executor: Arc<dyn QueryExecution>, config: LookupConfig) -> Self {
        Self { executor, config }
    }

    /// Favorites of one user, ordered by distribution.
    ///
    /// `size` defaults to the configured cap. Returns `{favorites, took}`.
    #[instrument(skip(self), fields(collection = %self.config.favorite_collection))]
    pub fn by_user(&self, user: &str, size: Option<u64>) -> LookupResult<ResultMap> {
        let size = size
            .filter(|s| *s > 0)
            .unwrap_or(self.config.favorite_by_user_size);
        let request = SearchRequest::new(Query::term("user", user))
            .with_size(size)
            .with_sort(SortSpec::asc("distribution"))
            .with_source(["author", "date", "distribution"]);

        let response = run(&*self.executor, &self.config.favorite_collection, &request)?;
        if response.is_empty() {
            return Ok(ResultMap::new());
        }

        let took = response.took;
        let favorites: Vec<Value> = response
            .hits
            .hits
            .into_iter()
            .map(|hit| Value::Object(hit.source))
            .collect();

        let mut result = ResultMap::new();
        result.insert("favorites".to_string(), Value::Array(favorites));
        result.insert("took".to_string(), json!(took));
        Ok(result)
    }

    /// Users who favorited a distribution, sorted and de-duplicated.
    ///
    /// Returns `{users: [...]}`.
    #[instrument(skip(self), fields(collection = %self.config.favorite_collection))]
    pub fn users_by_distribution(&self, distribution: &str) -> LookupResult<ResultMap> {
        let request = SearchRequest::new(Query::term("distribution", distribution))
            .with_size(self.config.users_by_distribution_size)
            .with_source(["user"]);

        let response = run(&*self.executor, &self.config.favorite_collection, &request)?;
        if response.is_empty() {
            return Ok(ResultMap::new());
        }

        let users: BTreeSet<String> = response
            .hits
            .hits
            .iter()
            .filter_map(|hit| hit.source.get("user").and_then(Value::as_str))
            .map(str::to_string)
            .collect();

        let mut result = ResultMap::new();
        result.insert("users".to_string(), json!(users));
        Ok(result)
    }

    /// Most recent favorites across all users, newest first.
    ///
    /// `page` is 1-based; page 0 is treated as page 1. Returns
    /// `{favorites, took, total}`.
    #[instrument(skip(self), fields(collection = %self.config.favorite_collection))]
    pub fn recent(&self, page: u64, size: u64) -> LookupResult<ResultMap> {
        let page = page.max(1);
        let request = SearchRequest::new(Query::MatchAll)
            .with_size(size)
            .with_from((page - 1).saturating_mul(size))
            .with_sort(SortSpec::desc("date"));

        let response = run(&*self.executor, &self.config.favorite_collection, &request)?;
        if response.is_empty() {
            return Ok(ResultMap::new());
        }

        let took = response.took;
        let total = response.total();
        let mut favorites = Vec::with_capacity(response.hits.hits.len());
        for hit in response.hits.hits {
            let fav: Favorite = serde_json::from_value(Value::Object(hit.source)).map_err(|source| {
                LookupError::Decode {
                    id: hit.id.clone(),
                    source,
                }
            })?;
            let mut doc = serde_json::to_value(&fav).map_err(|source| LookupError::Decode {
                id: hit.id.clone(),
                source,
            })?;
            if fav.id.is_none() {
                doc["id"] = Value::String(hit.id);
            }
            favorites.push(doc);
        }

        let mut result = ResultMap::new();
        result.insert("favorites".to_string(), Value::Array(favorites));
        result.insert("took".to_string(), json!(took));
        result.insert("total".to_string(), json!(total));
        Ok(result)
    }

    /// Most favorited distributions.
    ///
    /// Returns `{leaderboard: [{key, doc_count}], took, total}`.
    #[instrument(skip(self), fields(collection = %self.config.favorite_collection))]
    pub fn leaderboard(&self) -> LookupResult<ResultMap> {
        let request = SearchRequest::new(Query::MatchAll)
            .with_size(0)
            .with_aggregation(
                LEADERBOARD_AGG,
                Aggregation::terms("distribution", self.config.leaderboard_size),
            );

        let response = run(&*self.executor, &self.config.favorite_collection, &request)?;
        if response.is_empty() {
            return Ok(ResultMap::new());
        }

        let leaderboard = response.buckets(&[LEADERBOARD_AGG]);
        debug!(entries = leaderboard.len(), "leaderboard built");

        let mut result = ResultMap::new();
        result.insert("leaderboard".to_string(), json!(leaderboard));
        result.insert("took".to_string(), json!(response.took));
        result.insert("total".to_string(), json!(response.total()));
        Ok(result)
    }

    /// Favorite counts for the given distributions, plus which of them
    /// `user` has favorited.
    ///
    /// Returns `{favorites: {dist: count}, myfavorites: {dist: 1}, took}`.
    #[instrument(skip_all, fields(collection = %self.config.favorite_collection))]
    pub fn agg_by_distributions(
        &self,
        distributions: impl Into<OneOrMany>,
        user: Option<&str>,
    ) -> LookupResult<ResultMap> {
        let distributions = distributions.into().into_vec();
        if distributions.is_empty() {
            return Ok(ResultMap::new());
        }

        let buckets = distributions.len();
        let mut request = SearchRequest::new(
            BoolQuery::new().filter(Query::terms("distribution", distributions)),
        )
        .with_size(0)
        .with_aggregation(FAVORITES_AGG, Aggregation::terms("distribution", buckets));

        if let Some(user) = user {
            let mut entries = BTreeMap::new();
            entries.insert(
                ENTRIES_AGG.to_string(),
                Aggregation::terms("distribution", buckets),
            );
            request = request.with_aggregation(
                MY_FAVORITES_AGG,
                Aggregation::filter(Query::term("user", user), entries),
            );
        }

        let response = run(&*self.executor, &self.config.favorite_collection, &request)?;

        let favorites: Map<String, Value> = response
            .buckets(&[FAVORITES_AGG])
            .into_iter()
            .filter_map(|b| bucket_key(&b.key).map(|k| (k, json!(b.doc_count))))
            .collect();
        let myfavorites: Map<String, Value> = response
            .buckets(&[MY_FAVORITES_AGG, ENTRIES_AGG])
            .into_iter()
            .filter_map(|b| bucket_key(&b.key).map(|k| (k, json!(1))))
            .collect();

        let mut result = ResultMap::new();
        result.insert("favorites".to_string(), Value::Object(favorites));
        result.insert("myfavorites".to_string(), Value::Object(myfavorites));
        result.insert("took".to_string(), json!(response.took));
        Ok(result)
    }
}

fn bucket_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_empty_distribution_list_skips_store() {
        let q = FavoriteQuery::new(Arc::new(MemoryStore::new()), LookupConfig::default());
        assert!(q.agg_by_distributions(Vec::<String>::new(), None).unwrap().is_empty());
    }

    #[test]
    fn test_recent_huge_page_is_rejected_by_store() {
        let store = MemoryStore::with_collections(["favorite"]);
        let q = FavoriteQuery::new(Arc::new(store), LookupConfig::default());

        let err = q.recent(u64::MAX, 10).unwrap_err();
        assert!(matches!(
            err,
            LookupError::Execution(crate::query::ExecutionError::MalformedQuery(_))
        ));
    }

    #[test]
    fn test_bucket_key() {
        assert_eq!(bucket_key(&json!("Moose")), Some("Moose".into()));
        assert_eq!(bucket_key(&json!(7)), Some("7".into()));
        assert_eq!(bucket_key(&Value::Null), None);
    }
}
