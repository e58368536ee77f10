//! Value comparison between a source value and its stored textual form.
use migrator_shared::types::{CanonicalValue, FieldType, RawValue};

use crate::convert::{convert, is_truthy_text, parse_instant};

/// Largest accepted distance between two instants, in milliseconds.
const TIMESTAMP_TOLERANCE_MS: i64 = 1000;

const RELATIVE_EPSILON: f64 = 1e-9;

/// Compares a raw source value with the target's text for the same column.
///
/// Returns `None` when they agree, or a short diagnostic when they do not.
pub fn compare_field(raw: &RawValue, field_type: FieldType, target: Option<&str>) -> Option<String> {
    let source = convert(raw, field_type);
    match (source, target) {
        (None, None) => None,
        (None, Some(_)) => Some("source null, target not null".to_string()),
        (Some(_), None) => Some("source not null, target null".to_string()),
        (Some(source), Some(target)) => compare_present(&source, field_type, target),
    }
}

fn compare_present(source: &CanonicalValue, field_type: FieldType, target: &str) -> Option<String> {
    match (source, field_type) {
        (CanonicalValue::Boolean(expected), FieldType::Boolean) => {
            let actual = is_truthy_text(target);
            (*expected != actual).then(|| format!("source {expected}, target {target}"))
        }
        (CanonicalValue::Timestamp(expected), FieldType::Timestamp) => match parse_instant(target) {
            Some(actual) => {
                let drift = (actual - *expected).num_milliseconds().abs();
                (drift > TIMESTAMP_TOLERANCE_MS)
                    .then(|| format!("timestamps differ by {drift} ms"))
            }
            None => Some(format!("target {target:?} is not a timestamp")),
        },
        (_, FieldType::Integer | FieldType::Real) => {
            let expected = as_number(source);
            match (expected, target.trim().parse::<f64>().ok()) {
                (Some(a), Some(b)) if numbers_equal(a, b) => None,
                (Some(a), Some(b)) => Some(format!("source {a}, target {b}")),
                _ => Some(format!("target {target:?} is not numeric")),
            }
        }
        _ => {
            let expected = canonical_text(source);
            (expected != target).then(|| {
                format!(
                    "source len {}, target len {}",
                    expected.chars().count(),
                    target.chars().count()
                )
            })
        }
    }
}

fn as_number(value: &CanonicalValue) -> Option<f64> {
    match value {
        CanonicalValue::Integer(i) => Some(*i as f64),
        CanonicalValue::Real(r) => Some(*r),
        _ => None,
    }
}

fn numbers_equal(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= RELATIVE_EPSILON * scale
}

/// Textual form of a canonical value, as used for identity lookups.
pub fn canonical_text(value: &CanonicalValue) -> String {
    match value {
        CanonicalValue::Text(s) => s.clone(),
        CanonicalValue::Integer(i) => i.to_string(),
        CanonicalValue::Real(r) => r.to_string(),
        CanonicalValue::Boolean(b) => b.to_string(),
        CanonicalValue::Timestamp(t) => t.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
    }
}
