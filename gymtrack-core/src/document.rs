//! Document model shared by every store backend.
//!
//! A document is a flat map of JSON fields plus a store-assigned id. Records
//! are decoded from documents with serde; the id is injected under the `id`
//! key so record types can simply declare an `id: String` field.

use std::cmp::Ordering;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};

/// Field map of a document
pub type Fields = Map<String, Value>;

/// Key under which the document id is exposed to decoded records
pub const ID_FIELD: &str = "id";

/// A stored document: id plus its fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Get a field value by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Decode into a record type. The id is made available as `id`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let mut map = self.fields.clone();
        map.insert(ID_FIELD.to_owned(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(map)).map_err(|source| StoreError::Decode {
            id: self.id.clone(),
            source,
        })
    }
}

/// Encode a record into document fields.
///
/// `None` values and any `id` key are dropped; the store owns the id.
pub fn to_fields<T: Serialize>(record: &T) -> Result<Fields> {
    let value = serde_json::to_value(record).map_err(|source| StoreError::Encode { source })?;
    match value {
        Value::Object(mut map) => {
            map.remove(ID_FIELD);
            map.retain(|_, v| !v.is_null());
            Ok(map)
        }
        other => Err(StoreError::malformed(
            "<new>",
            format!("expected an object, got {}", type_name(&other)),
        )),
    }
}

/// Render a timestamp the way stores keep it: RFC 3339, UTC, millisecond precision.
///
/// Fixed width and the `Z` suffix make lexicographic order chronological.
pub fn timestamp_string(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Timestamp as a field value
pub fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(timestamp_string(at))
}

/// Compare two field values of the same JSON type.
///
/// Returns `None` for mismatched types: such values never satisfy a filter.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return Some(x.cmp(&y));
            }
            x.as_f64()?.partial_cmp(&y.as_f64()?)
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// JSON type name, matching Postgres `jsonb_typeof`
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
