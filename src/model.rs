//! Cupcake record and the typed field map used on the way in and out of the store.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Image used when a cupcake is created without one.
pub const DEFAULT_IMAGE: &str = "https://tinyurl.com/demo-cupcake";

/// A row from the `cupcakes` table.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Cupcake {
    pub id: i32,
    pub flavor: String,
    pub size: String,
    pub rating: f64,
    pub image: String,
}

impl Cupcake {
    /// Persisted values keyed by field, identity included.
    pub fn fields(&self) -> Fields {
        let mut out = Fields::new();
        out.insert(Field::Flavor, FieldValue::Text(self.flavor.clone()));
        out.insert(Field::Size, FieldValue::Text(self.size.clone()));
        out.insert(Field::Rating, FieldValue::Number(self.rating));
        out.insert(Field::Image, FieldValue::Text(self.image.clone()));
        out.insert(Field::Id, FieldValue::Integer(self.id.into()));
        out
    }
}

/// Cupcake fields in declared order. Ordering drives which field is cited first
/// when several fail validation, so variants must stay in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Flavor,
    Size,
    Rating,
    Image,
    Id,
}

impl Field {
    /// Fields a client supplies; `Id` is assigned by the store.
    pub const MUTABLE: [Field; 4] = [Field::Flavor, Field::Size, Field::Rating, Field::Image];

    /// Fields that create refuses to default.
    pub const REQUIRED: [Field; 3] = [Field::Flavor, Field::Size, Field::Rating];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Flavor => "flavor",
            Field::Size => "size",
            Field::Rating => "rating",
            Field::Image => "image",
            Field::Id => "id",
        }
    }

    /// Maps a `cupcakes` column name back to its field.
    pub fn from_column(name: &str) -> Option<Field> {
        match name {
            "flavor" => Some(Field::Flavor),
            "size" => Some(Field::Size),
            "rating" => Some(Field::Rating),
            "image" => Some(Field::Image),
            "id" => Some(Field::Id),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field value after normalization.
#[derive(Clone, Debug)]
pub enum FieldValue {
    /// Absent, null, or blank after trimming.
    Missing,
    Text(String),
    Number(f64),
    Integer(i64),
    /// Booleans, arrays and objects are carried as-is; the store rejects them.
    Other(Value),
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        use FieldValue::*;
        match (self, other) {
            (Missing, Missing) => true,
            (Text(a), Text(b)) => a == b,
            (Number(a), Number(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Number(a), Integer(b)) | (Integer(b), Number(a)) => *a == *b as f64,
            (Other(a), Other(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Missing => Ok(()),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Other(v) => write!(f, "{}", v),
        }
    }
}

pub type Fields = BTreeMap<Field, FieldValue>;

/// Raw request values keyed by field. Keys the client omitted are absent; a JSON
/// `null` is kept as `Value::Null` so callers can tell the two apart.
#[derive(Clone, Debug, Default)]
pub struct FieldInput(BTreeMap<Field, Value>);

impl FieldInput {
    /// Picks the mutable cupcake fields out of a request body. Unknown keys and
    /// any client-supplied `id` are ignored.
    pub fn from_body(body: &serde_json::Map<String, Value>) -> Self {
        let mut out = BTreeMap::new();
        for field in Field::MUTABLE {
            if let Some(v) = body.get(field.as_str()) {
                out.insert(field, v.clone());
            }
        }
        FieldInput(out)
    }

    pub fn get(&self, field: Field) -> Option<&Value> {
        self.0.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &Value)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }
}

impl<const N: usize> From<[(Field, Value); N]> for FieldInput {
    fn from(pairs: [(Field, Value); N]) -> Self {
        FieldInput(pairs.into_iter().collect())
    }
}
