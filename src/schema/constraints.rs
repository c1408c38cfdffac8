//! Field constraint library
//!
//! Reusable, composable constraints used to declare field shapes.
//!
//! Each constraint offers two pure operations:
//! - `coerce`: bring a heterogeneous input shape into the declared shape
//! - `check`: report the first failure found, as a message naming the path
//!
//! Coercion never fails. A value that cannot be coerced is returned
//! unchanged and the subsequent `check` reports it.

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

/// A named constraint on a JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Any string, including the empty string
    Str,
    /// A string with at least one character
    NonEmptyString,
    /// A boolean
    Bool,
    /// Any JSON number
    Number,
    /// An object whose declared sub-fields satisfy their own constraints.
    ///
    /// Unknown keys are ignored unless `closed` is set.
    StructuredDict {
        /// Declared sub-fields
        fields: Vec<DictField>,
        /// Reject keys that are not declared
        closed: bool,
    },
    /// A sequence of the inner constraint, or a bare value promoted to a
    /// one-element sequence
    CoercibleSequence(Box<Constraint>),
    /// A sequence of the inner constraint, no promotion
    Sequence(Box<Constraint>),
    /// An object or a sequence of objects, inner shape unchecked
    Dynamic,
    /// Any object, inner shape unchecked
    Opaque,
    /// A `[longitude, latitude]` pair of numbers
    GeoPoint,
    /// An ISO 8601 date-time string without offset, e.g. `2013-06-05T12:34:56`
    Timestamp,
}

/// A sub-field of a [`Constraint::StructuredDict`].
#[derive(Debug, Clone, PartialEq)]
pub struct DictField {
    /// Key inside the dict
    pub name: String,
    /// Whether the key must be present
    pub required: bool,
    /// Constraint applied to the value
    pub constraint: Constraint,
}

impl DictField {
    /// A sub-field that must be present
    pub fn required(name: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            name: name.into(),
            required: true,
            constraint,
        }
    }

    /// A sub-field that may be absent
    pub fn optional(name: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            name: name.into(),
            required: false,
            constraint,
        }
    }
}

impl Constraint {
    /// Open dict with the given sub-fields
    pub fn dict(fields: Vec<DictField>) -> Self {
        Constraint::StructuredDict {
            fields,
            closed: false,
        }
    }

    /// Dict that rejects undeclared keys
    pub fn closed_dict(fields: Vec<DictField>) -> Self {
        Constraint::StructuredDict {
            fields,
            closed: true,
        }
    }

    /// Scalar-or-sequence of `inner`
    pub fn coercible_sequence(inner: Constraint) -> Self {
        Constraint::CoercibleSequence(Box::new(inner))
    }

    /// Sequence of `inner`
    pub fn sequence(inner: Constraint) -> Self {
        Constraint::Sequence(Box::new(inner))
    }

    /// Returns the shape description used in failure messages
    pub fn describe(&self) -> &'static str {
        match self {
            Constraint::Str => "a string",
            Constraint::NonEmptyString => "a non-empty string",
            Constraint::Bool => "a boolean",
            Constraint::Number => "a number",
            Constraint::StructuredDict { .. } => "an object",
            Constraint::CoercibleSequence(_) | Constraint::Sequence(_) => "a sequence",
            Constraint::Dynamic => "an object or a sequence of objects",
            Constraint::Opaque => "an object",
            Constraint::GeoPoint => "a [longitude, latitude] pair of numbers",
            Constraint::Timestamp => "an ISO 8601 timestamp",
        }
    }

    /// Brings `value` into this constraint's structural shape.
    ///
    /// Sequence shape is tried first; on mismatch the value is treated as a
    /// scalar and wrapped. `null` is never wrapped.
    pub fn coerce(&self, value: Value) -> Value {
        match self {
            Constraint::CoercibleSequence(inner) => match value {
                Value::Null => Value::Null,
                Value::Array(items) => {
                    Value::Array(items.into_iter().map(|v| inner.coerce(v)).collect())
                }
                scalar => Value::Array(vec![inner.coerce(scalar)]),
            },
            Constraint::Sequence(inner) => match value {
                Value::Array(items) => {
                    Value::Array(items.into_iter().map(|v| inner.coerce(v)).collect())
                }
                other => other,
            },
            Constraint::StructuredDict { fields, .. } => match value {
                Value::Object(mut obj) => {
                    for field in fields {
                        if let Some(v) = obj.remove(&field.name) {
                            obj.insert(field.name.clone(), field.constraint.coerce(v));
                        }
                    }
                    Value::Object(obj)
                }
                other => other,
            },
            Constraint::GeoPoint => coerce_geo_point(value),
            _ => value,
        }
    }

    /// Checks `value`, returning the first failure as a message naming `path`.
    pub fn check(&self, path: &str, value: &Value) -> Result<(), String> {
        match self {
            Constraint::Str => expect(value.is_string(), path, self),
            Constraint::NonEmptyString => {
                let ok = value.as_str().map(|s| !s.is_empty()).unwrap_or(false);
                expect(ok, path, self)
            }
            Constraint::Bool => expect(value.is_boolean(), path, self),
            Constraint::Number => expect(value.is_number(), path, self),
            Constraint::StructuredDict { fields, closed } => {
                let obj = value.as_object().ok_or_else(|| failure(path, self))?;
                check_dict(path, obj, fields, *closed)
            }
            Constraint::CoercibleSequence(inner) | Constraint::Sequence(inner) => {
                let items = value.as_array().ok_or_else(|| failure(path, self))?;
                for (i, item) in items.iter().enumerate() {
                    inner.check(&format!("{}[{}]", path, i), item)?;
                }
                Ok(())
            }
            Constraint::Dynamic => {
                let ok = match value {
                    Value::Object(_) => true,
                    Value::Array(items) => items.iter().all(Value::is_object),
                    _ => false,
                };
                expect(ok, path, self)
            }
            Constraint::Opaque => expect(value.is_object(), path, self),
            Constraint::GeoPoint => {
                let ok = value
                    .as_array()
                    .map(|pair| pair.len() == 2 && pair.iter().all(Value::is_number))
                    .unwrap_or(false);
                expect(ok, path, self)
            }
            Constraint::Timestamp => {
                let ok = value
                    .as_str()
                    .map(|s| s.parse::<NaiveDateTime>().is_ok())
                    .unwrap_or(false);
                expect(ok, path, self)
            }
        }
    }
}

fn check_dict(
    path: &str,
    obj: &Map<String, Value>,
    fields: &[DictField],
    closed: bool,
) -> Result<(), String> {
    if closed {
        if let Some(extra) = obj.keys().find(|k| !fields.iter().any(|f| &f.name == *k)) {
            return Err(format!("{} is not allowed", make_path(path, extra)));
        }
    }

    for field in fields {
        let field_path = make_path(path, &field.name);
        match obj.get(&field.name) {
            Some(v) => field.constraint.check(&field_path, v)?,
            None if field.required => return Err(format!("{} is required", field_path)),
            None => {}
        }
    }

    Ok(())
}

/// Normalises the accepted geo-point shapes to `[lon, lat]`:
/// `[lon, lat]`, `{"lat": .., "lon": ..}` and `"lat,lon"`.
fn coerce_geo_point(value: Value) -> Value {
    match value {
        Value::Object(obj) => {
            let lon = obj.get("lon").filter(|v| v.is_number()).cloned();
            let lat = obj.get("lat").filter(|v| v.is_number()).cloned();
            match (lon, lat) {
                (Some(lon), Some(lat)) => Value::Array(vec![lon, lat]),
                _ => Value::Object(obj),
            }
        }
        Value::String(s) => {
            let mut parts = s.split(',').map(str::trim);
            let parsed = match (parts.next(), parts.next(), parts.next()) {
                (Some(lat), Some(lon), None) => lat.parse::<f64>().ok().zip(lon.parse::<f64>().ok()),
                _ => None,
            };
            match parsed {
                Some((lat, lon)) => Value::Array(vec![Value::from(lon), Value::from(lat)]),
                None => Value::String(s),
            }
        }
        other => other,
    }
}

fn expect(ok: bool, path: &str, constraint: &Constraint) -> Result<(), String> {
    if ok {
        Ok(())
    } else {
        Err(failure(path, constraint))
    }
}

fn failure(path: &str, constraint: &Constraint) -> String {
    format!("{} must be {}", path, constraint.describe())
}

/// Creates a field path from prefix and field name.
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
