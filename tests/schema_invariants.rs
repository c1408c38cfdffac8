//! Schema Invariant Tests
//!
//! Validation behavior of the Author and Favorite schemas:
//! - Validation is deterministic and does not mutate input
//! - Required fields are reported when absent
//! - Coercible fields accept their scalar shorthand
//! - Derived fields cannot be supplied
//! - One violation per field, first failure wins

use cpanmeta::document::{validate_author, validate_favorite, Author};
use cpanmeta::schema::Violation;
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn valid_author() -> Value {
    json!({
        "pauseid": "PERLER",
        "name": "Perl Hacker",
        "asciiname": "Perl Hacker",
        "website": ["https://perler.example"],
        "email": ["perler@example.com"],
        "profile": [{"name": "github", "id": "perler"}],
        "donation": [{"name": "paypal", "id": "perler@example.com"}],
        "city": "Berlin",
        "country": "DE",
        "location": [13.4, 52.5],
        "blog": [{"url": "https://blog.perler.example", "feed": "https://blog.perler.example/atom"}],
        "extra": {"pgp": "0xDEADBEEF"},
        "is_pause_custodial_account": false
    })
}

fn fields(violations: &[Violation]) -> Vec<&str> {
    violations.iter().map(|v| v.field.as_str()).collect()
}

// =============================================================================
// Determinism Tests
// =============================================================================

/// Same input yields the same violations every time.
#[test]
fn test_validation_is_deterministic() {
    let doc = json!({"pauseid": "PERLER", "email": 7, "city": ""});
    let first = validate_author(&doc);
    assert!(!first.is_empty());

    for _ in 0..100 {
        assert_eq!(validate_author(&doc), first);
    }
}

/// Validation never mutates its input.
#[test]
fn test_validation_does_not_mutate_input() {
    let doc = json!({"pauseid": "PERLER", "name": "P", "website": "https://x", "email": "p@x"});
    let before = doc.clone();
    assert!(validate_author(&doc).is_empty());
    assert_eq!(doc, before);
}

// =============================================================================
// Required Field Tests
// =============================================================================

/// Every absent required field is reported in declaration order.
#[test]
fn test_missing_required_fields() {
    let violations = validate_author(&json!({}));
    assert_eq!(fields(&violations), vec!["pauseid", "name", "website", "email"]);
    assert_eq!(violations[0].message, "pauseid is required");
}

/// A fully populated record has no violations.
#[test]
fn test_valid_author_passes() {
    assert!(validate_author(&valid_author()).is_empty());
}

/// Non-object input is a single root violation.
#[test]
fn test_non_object_input() {
    assert_eq!(validate_author(&json!(["PERLER"])), vec![Violation::not_an_object()]);
}

// =============================================================================
// Coercion Tests
// =============================================================================

/// Scalar shorthand for sequence fields validates after coercion.
#[test]
fn test_scalar_shorthand_accepted() {
    let mut doc = valid_author();
    doc["website"] = json!("https://perler.example");
    doc["email"] = json!("perler@example.com");
    doc["profile"] = json!({"name": "github", "id": "perler"});
    assert!(validate_author(&doc).is_empty());
}

/// Alternative geo point shapes are normalised before the check.
#[test]
fn test_location_shapes_accepted() {
    for location in [json!([13.4, 52.5]), json!({"lat": 52.5, "lon": 13.4}), json!("52.5,13.4")] {
        let mut doc = valid_author();
        doc["location"] = location;
        assert!(validate_author(&doc).is_empty());
    }

    let mut doc = valid_author();
    doc["location"] = json!("somewhere");
    assert_eq!(fields(&validate_author(&doc)), vec!["location"]);
}

/// Construction and validation agree on the coerced shape.
#[test]
fn test_construction_matches_validation() {
    let mut doc = valid_author();
    doc["location"] = json!("52.5,13.4");
    let author = Author::from_import(doc).unwrap();
    assert_eq!(author.location, Some([13.4, 52.5]));
}

// =============================================================================
// Constraint Failure Tests
// =============================================================================

/// Nested failures report the element path.
#[test]
fn test_nested_element_failure_message() {
    let mut doc = valid_author();
    doc["profile"] = json!([{"name": "github", "id": "perler"}, {"name": "", "id": "x"}]);
    let violations = validate_author(&doc);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, "profile");
    assert_eq!(violations[0].message, "profile[1].name must be a non-empty string");
}

/// Only the first failure per field is reported.
#[test]
fn test_first_failure_per_field() {
    let mut doc = valid_author();
    doc["email"] = json!([1, 2, 3]);
    let violations = validate_author(&doc);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].message, "email[0] must be a string");
}

/// Empty strings fail non-empty fields.
#[test]
fn test_empty_city_fails() {
    let mut doc = valid_author();
    doc["city"] = json!("");
    assert_eq!(fields(&validate_author(&doc)), vec!["city"]);
}

/// Donations take no scalar shorthand.
#[test]
fn test_donation_requires_sequence() {
    let mut doc = valid_author();
    doc["donation"] = json!({"name": "paypal", "id": "x"});
    assert_eq!(fields(&validate_author(&doc)), vec!["donation"]);
}

// =============================================================================
// Derived Field Tests
// =============================================================================

/// A supplied gravatar URL is rejected.
#[test]
fn test_gravatar_url_cannot_be_supplied() {
    let mut doc = valid_author();
    doc["gravatar_url"] = json!("https://example.com/me.png");
    assert_eq!(validate_author(&doc), vec![Violation::derived_field("gravatar_url")]);
}

// =============================================================================
// Favorite Schema Tests
// =============================================================================

/// Favorites need user, distribution and date.
#[test]
fn test_favorite_required_fields() {
    let violations = validate_favorite(&json!({"release": "Moose-2.2201"}));
    assert_eq!(fields(&violations), vec!["user", "distribution", "date"]);

    let ok = json!({"user": "abc123", "distribution": "Moose", "date": "2020-01-01T00:00:00"});
    assert!(validate_favorite(&ok).is_empty());
}
