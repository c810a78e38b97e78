use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TypeError;

/// A JSON object stored under a key.
///
/// The `id` field is derived: the store overwrites it with the textual form
/// of the document's own key on every insert, update and select. Whatever a
/// client puts there is never trusted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Name of the store-maintained identifier field.
    pub const ID_FIELD: &'static str = "id";

    /// Create an empty document.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a document from an arbitrary JSON value.
    ///
    /// Only objects are accepted.
    pub fn from_value(value: Value) -> Result<Self, TypeError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(TypeError::NotAnObject("null")),
            Value::Bool(_) => Err(TypeError::NotAnObject("boolean")),
            Value::Number(_) => Err(TypeError::NotAnObject("number")),
            Value::String(_) => Err(TypeError::NotAnObject("string")),
            Value::Array(_) => Err(TypeError::NotAnObject("array")),
        }
    }

    /// Overwrite the `id` field with the textual form of `key`.
    pub fn stamp_id(&mut self, key: &impl fmt::Display) {
        self.0
            .insert(Self::ID_FIELD.to_string(), Value::String(key.to_string()));
    }

    /// Consuming variant of [`stamp_id`](Self::stamp_id).
    pub fn with_id(mut self, key: &impl fmt::Display) -> Self {
        self.stamp_id(key);
        self
    }

    /// The `id` field, if present and a string.
    pub fn id(&self) -> Option<&str> {
        self.0.get(Self::ID_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Document {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        document.into_value()
    }
}
