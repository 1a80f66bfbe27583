//! Decoded API responses.

use crate::{PusherError, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::ops::Index;

/// Body of a successful (2xx) API call.
///
/// The top-level JSON object is addressable by key; nested values are left
/// as plain JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    fields: Map<String, Value>,
}

impl Response {
    /// Decode a response body. An empty body decodes to an empty object.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(body)? {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(PusherError::request(format!(
                "Expected a JSON object in response, got: {}",
                other
            ))),
        }
    }

    /// Look up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Whether a top-level field is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Top-level field names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the response object is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume the response and return the JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    /// Deserialize the response into a typed value.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.fields))?)
    }
}

impl Index<&str> for Response {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.fields.get(key).unwrap_or(&NULL)
    }
}

impl From<Map<String, Value>> for Response {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
