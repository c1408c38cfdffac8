//! Query evaluation for the in-memory store
//!
//! Scores one document against a query clause. `None` means no match.
//!
//! - `term`/`terms`/`ids`: exact value equality, no analysis
//! - `match`: lowercase alphanumeric tokens; `and` needs every query term,
//!   `or` needs one. A trailing `.analyzed` on the field name addresses the
//!   analyzed sub-field of the same source value.
//! - `nested`: any single object under `path` must satisfy the inner query
//! - `bool`: `must` and `filter` all match, `should` meets its threshold

use serde_json::{Map, Value};

use crate::query::{BoolQuery, Operator, Query};

/// Multi-field suffix for the analyzed form of a text field
pub const ANALYZED_SUFFIX: &str = ".analyzed";

/// Evaluates queries against stored documents
pub struct QueryMatcher;

impl QueryMatcher {
    /// Returns the document's score for `query`, or `None` if it does not match.
    pub fn score(query: &Query, id: &str, doc: &Map<String, Value>) -> Option<f64> {
        match query {
            Query::MatchAll => Some(1.0),
            Query::Term { field, value, boost } => values_at(doc, field)
                .into_iter()
                .any(|v| v == value)
                .then(|| f64::from(boost.unwrap_or(1.0))),
            Query::Terms { field, values } => values_at(doc, field)
                .into_iter()
                .any(|v| values.contains(v))
                .then_some(1.0),
            Query::Ids { values } => values.iter().any(|v| v == id).then_some(1.0),
            Query::Match {
                field,
                query,
                operator,
                boost,
            } => Self::score_match(doc, field, query, *operator)
                .map(|s| s * f64::from(boost.unwrap_or(1.0))),
            Query::Nested { path, query, boost } => {
                Self::score_nested(doc, id, path, query).map(|s| s * f64::from(boost.unwrap_or(1.0)))
            }
            Query::Bool(b) => Self::score_bool(b, id, doc),
        }
    }

    /// Returns true if the document matches `query`
    pub fn matches(query: &Query, id: &str, doc: &Map<String, Value>) -> bool {
        Self::score(query, id, doc).is_some()
    }

    fn score_match(
        doc: &Map<String, Value>,
        field: &str,
        query: &str,
        operator: Operator,
    ) -> Option<f64> {
        let query_terms = analyze(query);
        if query_terms.is_empty() {
            return None;
        }

        let source_field = field.strip_suffix(ANALYZED_SUFFIX).unwrap_or(field);
        let doc_terms: Vec<String> = values_at(doc, source_field)
            .into_iter()
            .filter_map(Value::as_str)
            .flat_map(analyze)
            .collect();

        let matched = query_terms
            .iter()
            .filter(|t| doc_terms.contains(*t))
            .count();

        let ok = match operator {
            Operator::And => matched == query_terms.len(),
            Operator::Or => matched > 0,
        };
        ok.then_some(matched as f64)
    }

    fn score_nested(doc: &Map<String, Value>, id: &str, path: &str, query: &Query) -> Option<f64> {
        values_at(doc, path)
            .into_iter()
            .filter(|v| v.is_object())
            .filter_map(|element| {
                // Re-root the element under its path so inner full paths resolve.
                let mut scoped = Map::new();
                insert_at_path(&mut scoped, path, element.clone());
                Self::score(query, id, &scoped)
            })
            .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.max(s))))
    }

    fn score_bool(b: &BoolQuery, id: &str, doc: &Map<String, Value>) -> Option<f64> {
        let mut total = 0.0;

        for clause in &b.must {
            total += Self::score(clause, id, doc)?;
        }
        for clause in &b.filter {
            Self::score(clause, id, doc)?;
        }

        let mut should_matched = 0;
        for clause in &b.should {
            if let Some(s) = Self::score(clause, id, doc) {
                should_matched += 1;
                total += s;
            }
        }

        (should_matched >= b.effective_minimum_should_match()).then_some(total)
    }
}

/// Lowercase alphanumeric tokens
pub fn analyze(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Leaf values at a dotted path; arrays along the way are flattened.
pub fn values_at<'a>(doc: &'a Map<String, Value>, path: &str) -> Vec<&'a Value> {
    let mut segments = path.split('.');
    let first = match segments.next().and_then(|s| doc.get(s)) {
        Some(v) => v,
        None => return Vec::new(),
    };

    let mut current = flatten_arrays(vec![first]);
    for segment in segments {
        let next: Vec<&Value> = current
            .into_iter()
            .filter_map(|v| v.get(segment))
            .collect();
        current = flatten_arrays(next);
    }
    current
}

fn flatten_arrays(values: Vec<&Value>) -> Vec<&Value> {
    let mut out = Vec::with_capacity(values.len());
    for v in values {
        match v {
            Value::Array(items) => out.extend(items.iter()),
            other => out.push(other),
        }
    }
    out
}

fn insert_at_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            root.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = root
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = child {
                insert_at_path(child, rest, value);
            }
        }
    }
}
