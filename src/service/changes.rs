//! Compare persisted values against a proposed update.

use crate::model::{Field, Fields};

#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    NoChange,
    Changed,
    Invalid(String),
}

/// Walk `from` in field order. An absent or blank proposed value stops the scan
/// with `Invalid`; otherwise any difference marks the result `Changed` and the
/// scan continues so later fields are still validated.
pub fn detect_changes(from: &Fields, to: &Fields) -> Change {
    let mut changed = false;
    for (field, current) in from {
        let proposed = match to.get(field) {
            Some(v) => v,
            None => return Change::Invalid(missing_message(*field)),
        };
        if proposed.is_missing() {
            return Change::Invalid(format!(
                "A non-blank value is required for {}. No updates occurred.",
                field
            ));
        }
        if current != proposed {
            changed = true;
        }
    }
    if changed {
        Change::Changed
    } else {
        Change::NoChange
    }
}

fn missing_message(field: Field) -> String {
    format!("Required fields not provided. {} was missing. No updates occurred.", field)
}
