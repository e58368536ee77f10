//! Type converter.
//!
//! Pure functions mapping a raw source value and a declared field type to the
//! canonical target value. Conversion is total: anything that cannot be
//! interpreted degrades to `None` (SQL NULL) instead of failing the row.
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use migrator_shared::types::{CanonicalValue, FieldType, RawValue};
use regex::Regex;

lazy_static! {
    static ref INTEGER_PREFIX: Regex = Regex::new(r"^[+-]?\d+").unwrap();
    static ref FLOAT_PREFIX: Regex =
        Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").unwrap();
    static ref EPOCH_MILLIS: Regex = Regex::new(r"^-?\d+$").unwrap();
}

/// Largest magnitude, in milliseconds, of a representable instant.
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

/// A converted value and whether information was lost producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub value: Option<CanonicalValue>,
    /// Set when a non-null input became null, an unrecognized boolean
    /// representation became `false`, or a number lost its fraction.
    pub lossy: bool,
}

impl Conversion {
    fn exact(value: Option<CanonicalValue>) -> Self {
        Self { value, lossy: false }
    }

    fn lossy(value: Option<CanonicalValue>) -> Self {
        Self { value, lossy: true }
    }

    fn from_option(value: Option<CanonicalValue>) -> Self {
        let lossy = value.is_none();
        Self { value, lossy }
    }
}

/// Converts `raw` to the canonical representation of `field_type`.
///
/// Never fails; `None` means SQL NULL.
pub fn convert(raw: &RawValue, field_type: FieldType) -> Option<CanonicalValue> {
    convert_checked(raw, field_type).value
}

/// Like [`convert`], also reporting whether the conversion lost information.
pub fn convert_checked(raw: &RawValue, field_type: FieldType) -> Conversion {
    if raw.is_null() {
        return Conversion::exact(None);
    }

    match field_type {
        FieldType::Boolean => to_boolean(raw),
        FieldType::Timestamp => Conversion::from_option(to_timestamp(raw).map(CanonicalValue::Timestamp)),
        FieldType::Integer => to_integer(raw),
        FieldType::Real => Conversion::from_option(to_real(raw).map(CanonicalValue::Real)),
        FieldType::Text => to_text(raw),
    }
}

/// The textual truthiness rule shared by conversion and verification.
pub fn is_truthy_text(value: &str) -> bool {
    value == "1" || value == "true"
}

/// Parses the textual forms of an instant accepted from either store.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f][offset]`, the same with a `T`
/// separator, a bare date (UTC midnight) and all-digit epoch milliseconds.
/// Offset-less forms are taken as UTC.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(parsed) = DateTime::parse_from_str(value, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    if EPOCH_MILLIS.is_match(value) {
        return value.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis);
    }

    None
}

fn to_boolean(raw: &RawValue) -> Conversion {
    let (value, recognized) = match raw {
        RawValue::Integer(i) => (*i == 1, *i == 0 || *i == 1),
        RawValue::Real(r) => (*r == 1.0, *r == 0.0 || *r == 1.0),
        RawValue::Text(s) => (is_truthy_text(s), matches!(s.as_str(), "0" | "1" | "true" | "false")),
        RawValue::Blob(_) | RawValue::Null => (false, false),
    };

    Conversion {
        value: Some(CanonicalValue::Boolean(value)),
        lossy: !recognized,
    }
}

fn to_timestamp(raw: &RawValue) -> Option<DateTime<Utc>> {
    match raw {
        RawValue::Integer(ms) => DateTime::from_timestamp_millis(*ms),
        RawValue::Real(ms) if ms.is_finite() && ms.abs() <= MAX_EPOCH_MILLIS => {
            DateTime::from_timestamp_millis(ms.trunc() as i64)
        }
        RawValue::Text(s) => parse_instant(s),
        RawValue::Blob(bytes) => std::str::from_utf8(bytes).ok().and_then(parse_instant),
        _ => None,
    }
}

fn to_integer(raw: &RawValue) -> Conversion {
    match raw {
        RawValue::Integer(i) => Conversion::exact(Some(CanonicalValue::Integer(*i))),
        RawValue::Real(r) => {
            if !r.is_finite() || *r < i64::MIN as f64 || *r >= i64::MAX as f64 {
                return Conversion::lossy(None);
            }
            let floored = r.floor();
            Conversion {
                value: Some(CanonicalValue::Integer(floored as i64)),
                lossy: floored != *r,
            }
        }
        RawValue::Text(s) => parse_integer_prefix(s),
        RawValue::Blob(bytes) => parse_integer_prefix(&String::from_utf8_lossy(bytes)),
        RawValue::Null => Conversion::exact(None),
    }
}

/// Parses a leading base-10 integer, ignoring leading whitespace and any
/// trailing text (`"42abc"` is 42, `"3.9"` is 3).
fn parse_integer_prefix(text: &str) -> Conversion {
    let trimmed = text.trim_start();
    let Some(prefix) = INTEGER_PREFIX.find(trimmed) else {
        return Conversion::lossy(None);
    };

    match prefix.as_str().parse::<i64>() {
        Ok(value) => Conversion {
            value: Some(CanonicalValue::Integer(value)),
            lossy: prefix.end() != trimmed.trim_end().len(),
        },
        Err(_) => Conversion::lossy(None),
    }
}

fn to_real(raw: &RawValue) -> Option<f64> {
    match raw {
        RawValue::Integer(i) => Some(*i as f64),
        RawValue::Real(r) => Some(*r),
        RawValue::Text(s) => parse_float_prefix(s),
        RawValue::Blob(bytes) => parse_float_prefix(&String::from_utf8_lossy(bytes)),
        RawValue::Null => None,
    }
}

fn parse_float_prefix(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    FLOAT_PREFIX
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

fn to_text(raw: &RawValue) -> Conversion {
    match raw {
        RawValue::Text(s) => Conversion::exact(Some(CanonicalValue::Text(s.clone()))),
        RawValue::Integer(i) => Conversion::exact(Some(CanonicalValue::Text(i.to_string()))),
        RawValue::Real(r) => Conversion::exact(Some(CanonicalValue::Text(r.to_string()))),
        RawValue::Blob(bytes) => match String::from_utf8(bytes.clone()) {
            Ok(text) => Conversion::exact(Some(CanonicalValue::Text(text))),
            Err(_) => Conversion::lossy(Some(CanonicalValue::Text(
                String::from_utf8_lossy(bytes).into_owned(),
            ))),
        },
        RawValue::Null => Conversion::exact(None),
    }
}
