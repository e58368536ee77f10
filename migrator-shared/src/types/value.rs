use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::FieldType;

/// A value exactly as the source driver returned it.
///
/// The source is dynamically typed per cell, so a column declared as a
/// boolean can hold integers in one row and text in the next.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Integer(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Real(value)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => f.write_str("NULL"),
            RawValue::Integer(i) => write!(f, "{i}"),
            RawValue::Real(r) => write!(f, "{r}"),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// A value normalized to its declared target representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CanonicalValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

impl CanonicalValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            CanonicalValue::Text(_) => FieldType::Text,
            CanonicalValue::Integer(_) => FieldType::Integer,
            CanonicalValue::Real(_) => FieldType::Real,
            CanonicalValue::Boolean(_) => FieldType::Boolean,
            CanonicalValue::Timestamp(_) => FieldType::Timestamp,
        }
    }
}

/// A canonical value paired with the declared type of its column.
///
/// Nulls still carry the declared type so a store can bind them with the
/// right parameter type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    pub field_type: FieldType,
    pub value: Option<CanonicalValue>,
}

impl TypedValue {
    pub fn new(field_type: FieldType, value: Option<CanonicalValue>) -> Self {
        Self { field_type, value }
    }

    pub fn null(field_type: FieldType) -> Self {
        Self {
            field_type,
            value: None,
        }
    }
}
