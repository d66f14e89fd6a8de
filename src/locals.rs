//! The mutable render context threaded through one ancestor chain.

use crate::constants::locals::{CONTENT, PATH, TITLE};
use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Key/value context a template renders against.
///
/// One `Locals` value is shared by `&mut` across a whole ancestor chain, so
/// `$content`, `$title` and legend fields written by one step are visible to
/// the next. Independent chains must start from a clone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Locals(Map<String, Value>);

impl Locals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds locals from a JSON value, which must be an object or null.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(Error::InputValidation(format!(
                "expected locals to be an object, got: {other}"
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Returns the value under `key` when it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Copies every entry of `fields` over the current values.
    pub fn assign(&mut self, fields: &Map<String, Value>) {
        for (key, value) in fields {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Copies entries of `fields` whose keys are not present yet.
    pub fn defaults(&mut self, fields: &Map<String, Value>) {
        for (key, value) in fields {
            if !self.0.contains_key(key) {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    /// Transcluded output of the previous chain step, `""` when unset.
    pub fn content(&self) -> &str {
        self.get_str(CONTENT).unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        self.get_str(TITLE).unwrap_or_default()
    }

    /// The virtual output path of the current chain, if assigned.
    pub fn path(&self) -> Option<&str> {
        self.get_str(PATH)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Snapshot of the whole context as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Locals {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
