//! Aggregations for the in-memory store
//!
//! Results use the engine's JSON shape:
//! - terms: `{"buckets": [{"key", "doc_count"}]}`, largest count first, ties by key
//! - filter: `{"doc_count": n, <sub-aggregation>: ...}`

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use super::matcher::{values_at, QueryMatcher};
use super::memory::StoredDocument;
use crate::query::Aggregation;

/// Evaluates every named aggregation over `docs`.
pub fn evaluate(
    aggregations: &BTreeMap<String, Aggregation>,
    docs: &[&StoredDocument],
) -> Map<String, Value> {
    aggregations
        .iter()
        .map(|(name, agg)| (name.clone(), evaluate_one(agg, docs)))
        .collect()
}

fn evaluate_one(agg: &Aggregation, docs: &[&StoredDocument]) -> Value {
    match agg {
        Aggregation::Terms { field, size } => terms(field, *size, docs),
        Aggregation::Filter {
            filter,
            aggregations,
        } => {
            let matching: Vec<&StoredDocument> = docs
                .iter()
                .copied()
                .filter(|d| QueryMatcher::matches(filter, &d.id, &d.source))
                .collect();

            let mut body = evaluate(aggregations, &matching);
            body.insert("doc_count".to_string(), json!(matching.len()));
            Value::Object(body)
        }
    }
}

fn terms(field: &str, size: usize, docs: &[&StoredDocument]) -> Value {
    // Keyed by the value's JSON text so numbers and strings never collide.
    let mut counts: BTreeMap<String, (Value, u64)> = BTreeMap::new();

    for doc in docs {
        let mut seen: Vec<&Value> = Vec::new();
        for value in values_at(&doc.source, field) {
            if value.is_null() || seen.contains(&value) {
                continue;
            }
            seen.push(value);
            counts
                .entry(value.to_string())
                .or_insert_with(|| (value.clone(), 0))
                .1 += 1;
        }
    }

    let mut buckets: Vec<(String, Value, u64)> = counts
        .into_iter()
        .map(|(text, (key, count))| (text, key, count))
        .collect();
    buckets.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
    buckets.truncate(size);

    let buckets: Vec<Value> = buckets
        .into_iter()
        .map(|(_, key, doc_count)| json!({ "key": key, "doc_count": doc_count }))
        .collect();
    json!({ "buckets": buckets })
}
