//! Request value normalization: trim strings, turn blanks into `Missing`.

use crate::model::{Field, FieldInput, FieldValue, Fields};
use serde_json::Value;

/// Normalize one raw value. Strings are trimmed and a string that trims to
/// nothing becomes `Missing`; `null` is `Missing` too. Other values pass through.
pub fn normalize_value(raw: &Value) -> FieldValue {
    match raw {
        Value::Null => FieldValue::Missing,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                FieldValue::Missing
            } else {
                FieldValue::Text(trimmed.to_string())
            }
        }
        Value::Number(n) => match n.as_i64() {
            Some(i) => FieldValue::Integer(i),
            None => n.as_f64().map(FieldValue::Number).unwrap_or_else(|| FieldValue::Other(raw.clone())),
        },
        other => FieldValue::Other(other.clone()),
    }
}

/// Normalize every value present in `input`. Keys absent from `input` stay absent.
pub fn normalize(input: &FieldInput) -> Fields {
    input.iter().map(|(field, raw)| (field, normalize_value(raw))).collect()
}

/// Like [`normalize`], but every mutable field is present; omitted ones are `Missing`.
pub fn normalize_all(input: &FieldInput) -> Fields {
    let mut out = normalize(input);
    for field in Field::MUTABLE {
        out.entry(field).or_insert(FieldValue::Missing);
    }
    out
}
