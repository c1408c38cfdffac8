//! Result sorting for the in-memory store
//!
//! Explicit sort specs are applied in order; with none, hits are ordered by
//! descending score. Sorting is stable, so ties keep insertion order.

use serde_json::Value;
use std::cmp::Ordering;

use super::matcher::values_at;
use super::memory::ScoredDocument;
use crate::query::{SortDirection, SortSpec};

/// Sorts scored documents
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts documents according to `specs`, or by score when `specs` is empty.
    pub fn sort(documents: &mut [ScoredDocument<'_>], specs: &[SortSpec]) {
        if specs.is_empty() {
            documents.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
            return;
        }

        documents.sort_by(|a, b| {
            for spec in specs {
                let a_val = values_at(&a.doc.source, &spec.field).into_iter().next();
                let b_val = values_at(&b.doc.source, &spec.field).into_iter().next();

                let ordering = match (a_val, b_val) {
                    // Missing values sort last in either direction.
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Greater,
                    (Some(_), None) => Ordering::Less,
                    (Some(x), Some(y)) => {
                        let natural = Self::compare_values(x, y);
                        match spec.direction {
                            SortDirection::Asc => natural,
                            SortDirection::Desc => natural.reverse(),
                        }
                    }
                };

                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    /// Compares two JSON values for sorting.
    ///
    /// Ordering rules:
    /// - null < bool < number < string
    /// - For same types, natural ordering
    fn compare_values(a: &Value, b: &Value) -> Ordering {
        let type_order = |v: &Value| -> u8 {
            match v {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Number(_) => 2,
                Value::String(_) => 3,
                Value::Array(_) => 4,
                Value::Object(_) => 5,
            }
        };

        let a_type = type_order(a);
        let b_type = type_order(b);
        if a_type != b_type {
            return a_type.cmp(&b_type);
        }

        match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Number(x), Value::Number(y)) => {
                let x = x.as_f64().unwrap_or(0.0);
                let y = y.as_f64().unwrap_or(0.0);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            _ => Ordering::Equal,
        }
    }
}
