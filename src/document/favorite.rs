//! Favorite document
//!
//! A user's "++" on a distribution. Favorites are written elsewhere; this
//! crate only reads them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use crate::schema::{self, Constraint, FieldDescriptor, Schema, Violation};

static FAVORITE_SCHEMA: OnceLock<Schema> = OnceLock::new();

/// Returns the Favorite field descriptor table.
pub fn favorite_schema() -> &'static Schema {
    FAVORITE_SCHEMA.get_or_init(|| {
        Schema::new(
            "favorite",
            vec![
                FieldDescriptor::required("user", Constraint::NonEmptyString),
                FieldDescriptor::required("distribution", Constraint::NonEmptyString),
                FieldDescriptor::required("date", Constraint::Timestamp),
                FieldDescriptor::optional("id", Constraint::Str),
                FieldDescriptor::optional("release", Constraint::Str),
                FieldDescriptor::optional("author", Constraint::Str),
            ],
        )
    })
}

/// Validates raw favorite input against the Favorite schema.
pub fn validate_favorite(input: &Value) -> Vec<Violation> {
    schema::validate(favorite_schema(), input)
}

/// A favorite, identified by (`user`, `distribution`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user: String,
    pub distribution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub date: NaiveDateTime,
}

impl Favorite {
    /// Identity of the favorite
    pub fn key(&self) -> (&str, &str) {
        (&self.user, &self.distribution)
    }
}
