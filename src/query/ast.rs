//! Structured query model
//!
//! A typed form of the search engine's query DSL. Requests are built by the
//! lookup sets, serialised to the engine's JSON body format, and evaluated
//! directly by the in-memory store.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// How the terms of an analyzed match combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    /// Any term may match
    #[default]
    Or,
    /// Every term must match
    And,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Or => "or",
            Operator::And => "and",
        }
    }
}

/// A query clause
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Every document
    MatchAll,
    /// Exact value on a keyword field
    Term {
        field: String,
        value: Value,
        boost: Option<f32>,
    },
    /// Exact match against any of several values
    Terms { field: String, values: Vec<Value> },
    /// Document key lookup
    Ids { values: Vec<String> },
    /// Analyzed (tokenised) full-text match
    Match {
        field: String,
        query: String,
        operator: Operator,
        boost: Option<f32>,
    },
    /// Query against objects of a nested sequence field
    Nested {
        path: String,
        query: Box<Query>,
        boost: Option<f32>,
    },
    /// Boolean combination
    Bool(BoolQuery),
}

impl Query {
    /// Exact term query
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Term {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }

    /// Terms (any-of) query
    pub fn terms<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Query::Terms {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Document key query
    pub fn ids<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query::Ids {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Analyzed match query
    pub fn matches(field: impl Into<String>, query: impl Into<String>, operator: Operator) -> Self {
        Query::Match {
            field: field.into(),
            query: query.into(),
            operator,
            boost: None,
        }
    }

    /// Nested query
    pub fn nested(path: impl Into<String>, query: Query) -> Self {
        Query::Nested {
            path: path.into(),
            query: Box::new(query),
            boost: None,
        }
    }

    /// Sets the boost on clauses that carry one.
    ///
    /// A boost of exactly 1.0 is the engine default and is not recorded.
    pub fn with_boost(mut self, value: f32) -> Self {
        let recorded = if value == 1.0 { None } else { Some(value) };
        match &mut self {
            Query::Term { boost, .. } | Query::Match { boost, .. } | Query::Nested { boost, .. } => {
                *boost = recorded
            }
            _ => {}
        }
        self
    }

    /// Returns the clause boost, 1.0 when unset
    pub fn boost(&self) -> f32 {
        match self {
            Query::Term { boost, .. } | Query::Match { boost, .. } | Query::Nested { boost, .. } => {
                boost.unwrap_or(1.0)
            }
            _ => 1.0,
        }
    }

    /// Renders the clause in the engine's JSON form
    pub fn to_value(&self) -> Value {
        match self {
            Query::MatchAll => json!({ "match_all": {} }),
            Query::Term { field, value, boost } => {
                let body = match boost {
                    Some(b) => json!({ "value": value, "boost": b }),
                    None => value.clone(),
                };
                json!({ "term": { field.as_str(): body } })
            }
            Query::Terms { field, values } => json!({ "terms": { field.as_str(): values } }),
            Query::Ids { values } => json!({ "ids": { "values": values } }),
            Query::Match {
                field,
                query,
                operator,
                boost,
            } => {
                let mut body = json!({ "query": query, "operator": operator.as_str() });
                if let Some(b) = boost {
                    body["boost"] = json!(b);
                }
                json!({ "match": { field.as_str(): body } })
            }
            Query::Nested { path, query, boost } => {
                let mut body = json!({ "path": path, "query": query.to_value() });
                if let Some(b) = boost {
                    body["boost"] = json!(b);
                }
                json!({ "nested": body })
            }
            Query::Bool(b) => b.to_value(),
        }
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Boolean combination of clauses
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoolQuery {
    /// All must match and contribute to the score
    pub must: Vec<Query>,
    /// Any may match; at least one when there is no `must`/`filter`
    pub should: Vec<Query>,
    /// All must match, no scoring
    pub filter: Vec<Query>,
    /// Explicit lower bound on matching `should` clauses
    pub minimum_should_match: Option<usize>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `should` clause
    pub fn should(mut self, query: Query) -> Self {
        self.should.push(query);
        self
    }

    /// Adds a `must` clause
    pub fn must(mut self, query: Query) -> Self {
        self.must.push(query);
        self
    }

    /// Adds a `filter` clause
    pub fn filter(mut self, query: Query) -> Self {
        self.filter.push(query);
        self
    }

    /// Sets the minimum number of matching `should` clauses
    pub fn with_minimum_should_match(mut self, minimum: usize) -> Self {
        self.minimum_should_match = Some(minimum);
        self
    }

    /// The effective `should` threshold.
    ///
    /// Defaults to 1 when only `should` clauses exist, 0 otherwise.
    pub fn effective_minimum_should_match(&self) -> usize {
        match self.minimum_should_match {
            Some(n) => n,
            None if self.must.is_empty() && self.filter.is_empty() && !self.should.is_empty() => 1,
            None => 0,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut body = Map::new();
        for (key, clauses) in [("must", &self.must), ("should", &self.should), ("filter", &self.filter)] {
            if !clauses.is_empty() {
                body.insert(
                    key.to_string(),
                    Value::Array(clauses.iter().map(Query::to_value).collect()),
                );
            }
        }
        if let Some(n) = self.minimum_should_match {
            body.insert("minimum_should_match".to_string(), json!(n));
        }
        json!({ "bool": body })
    }
}

impl From<BoolQuery> for Query {
    fn from(b: BoolQuery) -> Self {
        Query::Bool(b)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Field to sort by
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    pub fn to_value(&self) -> Value {
        json!({ self.field.as_str(): { "order": self.direction.as_str() } })
    }
}

/// A bucketing aggregation
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// One bucket per distinct value, largest first
    Terms { field: String, size: usize },
    /// Single bucket of documents matching `filter`, with sub-aggregations
    Filter {
        filter: Query,
        aggregations: BTreeMap<String, Aggregation>,
    },
}

impl Aggregation {
    pub fn terms(field: impl Into<String>, size: usize) -> Self {
        Aggregation::Terms {
            field: field.into(),
            size,
        }
    }

    pub fn filter(filter: Query, aggregations: BTreeMap<String, Aggregation>) -> Self {
        Aggregation::Filter {
            filter,
            aggregations,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Aggregation::Terms { field, size } => {
                json!({ "terms": { "field": field, "size": size } })
            }
            Aggregation::Filter {
                filter,
                aggregations,
            } => json!({
                "filter": filter.to_value(),
                "aggs": aggregations_to_value(aggregations),
            }),
        }
    }
}

fn aggregations_to_value(aggregations: &BTreeMap<String, Aggregation>) -> Value {
    Value::Object(
        aggregations
            .iter()
            .map(|(name, agg)| (name.clone(), agg.to_value()))
            .collect(),
    )
}

/// A complete search request against one collection
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Query clause
    pub query: Query,
    /// Page size
    pub size: u64,
    /// Pagination offset
    pub from: u64,
    /// Sort order; relevance when empty
    pub sort: Vec<SortSpec>,
    /// Restrict `_source` to these fields
    pub source: Option<Vec<String>>,
    /// Named aggregations
    pub aggregations: BTreeMap<String, Aggregation>,
}

impl SearchRequest {
    /// Creates a request with size 10 and offset 0
    pub fn new(query: impl Into<Query>) -> Self {
        Self {
            query: query.into(),
            size: 10,
            from: 0,
            sort: Vec::new(),
            source: None,
            aggregations: BTreeMap::new(),
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_from(mut self, from: u64) -> Self {
        self.from = from;
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn with_source<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_aggregation(mut self, name: impl Into<String>, agg: Aggregation) -> Self {
        self.aggregations.insert(name.into(), agg);
        self
    }

    /// Renders the request body in the engine's JSON form
    pub fn to_value(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), self.query.to_value());
        body.insert("size".to_string(), json!(self.size));
        body.insert("from".to_string(), json!(self.from));
        if !self.sort.is_empty() {
            body.insert(
                "sort".to_string(),
                Value::Array(self.sort.iter().map(SortSpec::to_value).collect()),
            );
        }
        if let Some(fields) = &self.source {
            body.insert("_source".to_string(), json!(fields));
        }
        if !self.aggregations.is_empty() {
            body.insert("aggs".to_string(), aggregations_to_value(&self.aggregations));
        }
        Value::Object(body)
    }
}

impl Serialize for SearchRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl From<Query> for SearchRequest {
    fn from(query: Query) -> Self {
        SearchRequest::new(query)
    }
}
