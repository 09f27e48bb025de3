//! String-keyed dictionary
//!
//! An insertion-ordered map from names to values that converts to and from
//! a plain record. Initial contents and patches come either as a record or
//! as an array of `[key, value]` pairs.

use crate::error::{StruxError, StruxResult};
use crate::json;
use crate::keys::Normalize;
use crate::predicates::is_nil;
use crate::value::{Value, ValueRecord};
use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict {
    entries: IndexMap<String, Value>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a record, an array of pairs, or nothing
    pub fn from_value(value: &Value) -> StruxResult<Self> {
        let mut dict = Self::new();
        dict.patch(value)?;
        Ok(dict)
    }

    pub fn from_record(record: &ValueRecord) -> Self {
        Self {
            entries: record.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.entries.insert(key.into(), value);
        self
    }

    /// Set with a runtime key, which must be a string
    pub fn set_dynamic(&mut self, key: &Value, value: Value) -> StruxResult<&mut Self> {
        match key {
            Value::String(name) => Ok(self.set(name.as_ref(), value)),
            other => Err(StruxError::mismatch(other, "is_string")),
        }
    }

    /// Set every entry of a record or an array of pairs; nil is a no-op
    pub fn patch(&mut self, value: &Value) -> StruxResult<&mut Self> {
        for (key, value) in entries_of(value)? {
            self.set(key, value);
        }
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn to_record(&self) -> ValueRecord {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn to_json(&self) -> StruxResult<String> {
        json::encode(&Value::Record(self.to_record()))
    }
}

impl Normalize for Dict {
    fn to_plain(&self) -> Value {
        Value::Record(self.to_record())
    }
}

/// Entries of a record, or of an array of `[key, value]` pairs
pub(crate) fn entries_of(value: &Value) -> StruxResult<Vec<(String, Value)>> {
    match value {
        v if is_nil(v) => Ok(Vec::new()),
        Value::Record(fields) => Ok(fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        Value::Array(pairs) => pairs.iter().map(pair_of).collect(),
        other => Err(StruxError::mismatch(other, "is_record")),
    }
}

fn pair_of(pair: &Value) -> StruxResult<(String, Value)> {
    let Value::Array(items) = pair else {
        return Err(StruxError::mismatch(pair, "is_sequence"));
    };
    match items.get(0) {
        Some(Value::String(key)) => Ok((
            key.to_string(),
            items.get(1).cloned().unwrap_or_default(),
        )),
        Some(other) => Err(StruxError::mismatch(other, "is_string")),
        None => Err(StruxError::mismatch(&Value::Undefined, "is_string")),
    }
}
