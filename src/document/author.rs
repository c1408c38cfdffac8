//! Author document
//!
//! Construction is lenient: coercible fields are normalised, absent
//! required fields default to empty, and nothing is rejected for being
//! missing. The validator is the enforcement point, so partially built
//! records can exist transiently during import.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::errors::{json_type_name, DocumentError, DocumentResult};
use super::gravatar;
use crate::schema::{self, Constraint, DictField, FieldDescriptor, Schema, Violation};

/// Name of the derived avatar field
pub const GRAVATAR_URL_FIELD: &str = "gravatar_url";

static AUTHOR_SCHEMA: OnceLock<Schema> = OnceLock::new();

/// Returns the Author field descriptor table.
pub fn author_schema() -> &'static Schema {
    AUTHOR_SCHEMA.get_or_init(build_author_schema)
}

fn name_id_pair() -> Constraint {
    Constraint::dict(vec![
        DictField::required("name", Constraint::NonEmptyString),
        DictField::required("id", Constraint::Str),
    ])
}

fn build_author_schema() -> Schema {
    Schema::new(
        "author",
        vec![
            FieldDescriptor::required("pauseid", Constraint::Str),
            FieldDescriptor::required("name", Constraint::NonEmptyString),
            FieldDescriptor::optional("asciiname", Constraint::Str),
            FieldDescriptor::required("website", Constraint::coercible_sequence(Constraint::Str))
                .coerce(),
            FieldDescriptor::required("email", Constraint::coercible_sequence(Constraint::Str))
                .coerce(),
            FieldDescriptor::internal("user"),
            FieldDescriptor::derived(GRAVATAR_URL_FIELD),
            FieldDescriptor::optional("profile", Constraint::coercible_sequence(name_id_pair()))
                .coerce(),
            FieldDescriptor::optional("blog", Constraint::Dynamic),
            FieldDescriptor::optional("perlmongers", Constraint::Dynamic),
            FieldDescriptor::optional("donation", Constraint::sequence(name_id_pair())),
            FieldDescriptor::optional("city", Constraint::NonEmptyString),
            FieldDescriptor::optional("region", Constraint::NonEmptyString),
            FieldDescriptor::optional("country", Constraint::NonEmptyString),
            FieldDescriptor::optional("location", Constraint::GeoPoint).coerce(),
            FieldDescriptor::optional("extra", Constraint::Opaque),
            FieldDescriptor::optional("updated", Constraint::Str),
            FieldDescriptor::optional("is_pause_custodial_account", Constraint::Bool),
        ],
    )
}

/// Validates raw author input against the Author schema.
pub fn validate_author(input: &Value) -> Vec<Violation> {
    schema::validate(author_schema(), input)
}

/// An external profile (`{name, id}`), e.g. a github or stackoverflow handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub id: String,
}

/// A donation channel (`{name, id}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub name: String,
    pub id: String,
}

/// A CPAN author record, keyed by PAUSE id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pauseid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub asciiname: String,
    #[serde(default)]
    pub website: Vec<String>,
    #[serde(default)]
    pub email: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Vec<Profile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perlmongers: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donation: Option<Vec<Donation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// `[longitude, latitude]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default)]
    pub is_pause_custodial_account: bool,
    #[serde(skip)]
    gravatar: OnceLock<String>,
}

impl Author {
    /// Builds an author from bulk import data.
    ///
    /// `user` and `gravatar_url` are not accepted from import input and are
    /// dropped before decoding.
    pub fn from_import(input: Value) -> DocumentResult<Self> {
        let mut obj = into_object(input)?;
        obj.remove("user");
        Self::decode(obj)
    }

    /// Rebuilds an author from a stored index `_source`.
    ///
    /// Unlike [`Author::from_import`], a linked `user` is kept.
    pub fn from_source(source: Value) -> DocumentResult<Self> {
        Self::decode(into_object(source)?)
    }

    fn decode(mut obj: Map<String, Value>) -> DocumentResult<Self> {
        obj.remove(GRAVATAR_URL_FIELD);
        // An explicit null reads as an absent field.
        obj.retain(|_, v| !v.is_null());
        author_schema().coerce(&mut obj);
        Ok(serde_json::from_value(Value::Object(obj))?)
    }

    /// The PAUSE id; immutable once constructed.
    pub fn pauseid(&self) -> &str {
        &self.pauseid
    }

    /// The linked account, if the linking step has run.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Links this author to an account.
    pub fn link_user(&mut self, user: impl Into<String>) {
        self.user = Some(user.into());
    }

    /// Avatar URL, derived from the PAUSE id on first access and memoised.
    pub fn gravatar_url(&self) -> &str {
        self.gravatar
            .get_or_init(|| gravatar::gravatar_url(&self.pauseid))
    }

    /// Longitude of `location`
    pub fn longitude(&self) -> Option<f64> {
        self.location.map(|[lon, _]| lon)
    }

    /// Latitude of `location`
    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|[_, lat]| lat)
    }

    /// Renders the record, including the derived avatar URL, as a JSON object.
    pub fn to_document(&self) -> DocumentResult<Map<String, Value>> {
        let mut obj = into_object(serde_json::to_value(self)?)?;
        obj.insert(
            GRAVATAR_URL_FIELD.to_string(),
            Value::String(self.gravatar_url().to_string()),
        );
        Ok(obj)
    }
}

fn into_object(value: Value) -> DocumentResult<Map<String, Value>> {
    match value {
        Value::Object(obj) => Ok(obj),
        other => Err(DocumentError::NotAnObject(json_type_name(&other))),
    }
}
