use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Structured key/value payload stored in a single column.
///
/// Keys are kept sorted so the serialised form is stable. The top level is
/// always an object; nested values may be any JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Parse a JSON document; only objects are accepted
    pub fn from_json(text: &str) -> crate::Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| crate::Error::InvalidPayload(e.to_string()))?;
        Self::try_from(value)
    }

    pub fn to_json(&self) -> String {
        // A map of `Value`s cannot fail to serialise
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

impl TryFrom<Value> for Payload {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(crate::Error::InvalidPayload(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            ))),
        }
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
