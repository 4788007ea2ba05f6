//! Opaque product record with a mandatory identifier.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a JSON value was rejected as a product record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRecord {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("record has no usable id")]
    MissingId,
}

/// A product as returned by the catalog.
///
/// Only `id` is interpreted; every other field is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Product {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Product {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter, mostly for fixtures.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title").and_then(Value::as_str)
    }
}

impl TryFrom<Value> for Product {
    type Error = InvalidRecord;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut fields = match value {
            Value::Object(map) => map,
            other => return Err(InvalidRecord::NotAnObject(kind_of(&other))),
        };

        let id = match fields.remove("id") {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(InvalidRecord::MissingId),
        };

        Ok(Self { id, fields })
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
