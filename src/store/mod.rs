//! Cupcake persistence: the store contract, write preparation, and the backends.

mod memory;
mod postgres;

pub use memory::MemoryCupcakeStore;
pub use postgres::{ensure_cupcakes_table, ensure_database_exists, PgCupcakeStore};

use crate::error::StoreError;
use crate::model::{Cupcake, Field, FieldValue, Fields};
use async_trait::async_trait;

/// Longest flavor or size the `cupcakes` table accepts.
pub const MAX_TEXT_LEN: usize = 64;

/// Row storage for cupcakes. Every mutating call is atomic: it either commits
/// in full or leaves the table untouched.
#[async_trait]
pub trait CupcakeStore: Send + Sync {
    /// All rows ordered by id.
    async fn list(&self) -> Result<Vec<Cupcake>, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<Cupcake>, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;

    /// Insert a row and return it with its assigned id.
    async fn insert(&self, draft: &CupcakeDraft) -> Result<Cupcake, StoreError>;

    /// Replace all mutable columns. `None` when no row has this id.
    async fn update(&self, id: i32, draft: &CupcakeDraft) -> Result<Option<Cupcake>, StoreError>;

    /// Remove a row and return what was removed. `None` when no row has this id.
    async fn delete(&self, id: i32) -> Result<Option<Cupcake>, StoreError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Column values ready to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct CupcakeDraft {
    pub flavor: String,
    pub size: String,
    pub rating: f64,
    pub image: String,
}

impl CupcakeDraft {
    /// Coerce normalized fields into column types, applying the same rules the
    /// table enforces: required columns present, text within length, rating numeric.
    /// A missing image takes `default_image`.
    pub fn from_fields(fields: &Fields, default_image: &str) -> Result<Self, StoreError> {
        let image = match fields.get(&Field::Image) {
            None | Some(FieldValue::Missing) => default_image.to_string(),
            Some(v) => text_column(Field::Image, v, None)?,
        };
        Ok(CupcakeDraft {
            flavor: text_column(Field::Flavor, required(fields, Field::Flavor)?, Some(MAX_TEXT_LEN))?,
            size: text_column(Field::Size, required(fields, Field::Size)?, Some(MAX_TEXT_LEN))?,
            rating: float_column(Field::Rating, required(fields, Field::Rating)?)?,
            image,
        })
    }
}

fn required(fields: &Fields, field: Field) -> Result<&FieldValue, StoreError> {
    match fields.get(&field) {
        Some(v) if !v.is_missing() => Ok(v),
        _ => Err(StoreError::Constraint {
            column: Some(field),
            detail: format!("null value in column \"{}\" violates not-null constraint", field),
        }),
    }
}

fn text_column(field: Field, value: &FieldValue, max_len: Option<usize>) -> Result<String, StoreError> {
    let text = match value {
        FieldValue::Text(s) => s.clone(),
        FieldValue::Number(_) | FieldValue::Integer(_) => value.to_string(),
        FieldValue::Missing | FieldValue::Other(_) => {
            return Err(StoreError::Coercion {
                column: Some(field),
                detail: format!("cannot store {} as text", describe(value)),
            })
        }
    };
    if let Some(max) = max_len {
        if text.chars().count() > max {
            return Err(StoreError::Constraint {
                column: Some(field),
                detail: format!("value too long for type character varying({})", max),
            });
        }
    }
    Ok(text)
}

fn float_column(field: Field, value: &FieldValue) -> Result<f64, StoreError> {
    let parsed = match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Integer(n) => Some(*n as f64),
        FieldValue::Text(s) => s.parse::<f64>().ok(),
        FieldValue::Missing | FieldValue::Other(_) => None,
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(StoreError::Coercion {
            column: Some(field),
            detail: format!("invalid input syntax for type double precision: {}", describe(value)),
        }),
    }
}

fn describe(value: &FieldValue) -> String {
    match value {
        FieldValue::Missing => "null".into(),
        FieldValue::Text(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}
