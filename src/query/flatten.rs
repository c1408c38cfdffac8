//! Result-shape normalisation
//!
//! The engine returns multi-valued fields as arrays even when they hold a
//! single value. Consumers expect scalars in that case.

use serde_json::{Map, Value};

/// Replaces every top-level one-element array in `doc` with its element.
pub fn single_valued_to_scalar(doc: &mut Map<String, Value>) {
    for value in doc.values_mut() {
        let single = match value {
            Value::Array(items) if items.len() == 1 => items.pop(),
            _ => None,
        };
        if let Some(only) = single {
            *value = only;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_valued_arrays_flatten() {
        let mut doc = json!({
            "email": ["a@b.c"],
            "website": ["x", "y"],
            "profile": [{"name": "github", "id": "a"}],
            "empty": [],
            "name": "A"
        })
        .as_object()
        .cloned()
        .unwrap();

        single_valued_to_scalar(&mut doc);

        assert_eq!(doc["email"], json!("a@b.c"));
        assert_eq!(doc["website"], json!(["x", "y"]));
        assert_eq!(doc["profile"], json!({"name": "github", "id": "a"}));
        assert_eq!(doc["empty"], json!([]));
        assert_eq!(doc["name"], json!("A"));
    }
}
