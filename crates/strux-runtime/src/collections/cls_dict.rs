//! Class-coercing string-keyed dictionary

use super::dict::entries_of;
use super::{insert_batch, BatchMode};
use crate::class::{ClassRef, Instance};
use crate::coerce::to_instance;
use crate::error::StruxResult;
use crate::json;
use crate::keys::Normalize;
use crate::policy::Policy;
use crate::value::{Value, ValueRecord};
use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct ClsDict {
    class: ClassRef,
    entries: IndexMap<String, Instance>,
    batch: BatchMode,
}

impl ClsDict {
    pub fn new(class: &ClassRef) -> Self {
        Self::with_policy(class, &Policy::default())
    }

    pub fn with_policy(class: &ClassRef, policy: &Policy) -> Self {
        Self {
            class: class.clone(),
            entries: IndexMap::new(),
            batch: policy.batch,
        }
    }

    /// Build from a record, an array of pairs, or nothing
    pub fn from_value(class: &ClassRef, value: &Value) -> StruxResult<Self> {
        Self::from_value_with(class, &Policy::default(), value)
    }

    pub fn from_value_with(class: &ClassRef, policy: &Policy, value: &Value) -> StruxResult<Self> {
        let mut dict = Self::with_policy(class, policy);
        dict.patch(value)?;
        Ok(dict)
    }

    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) -> StruxResult<&mut Self> {
        let item = to_instance(value, &self.class)?;
        self.entries.insert(key.into(), item);
        Ok(self)
    }

    /// Coerce and set every entry of a record or an array of pairs
    pub fn patch(&mut self, value: &Value) -> StruxResult<&mut Self> {
        let (keys, values): (Vec<String>, Vec<Value>) = entries_of(value)?.into_iter().unzip();
        let entries = &mut self.entries;
        let mut keys = keys.into_iter();
        insert_batch(self.batch, &self.class, values, |item| {
            if let Some(key) = keys.next() {
                entries.insert(key, item);
            }
        })?;
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&Instance> {
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

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Instance> {
        self.entries.iter()
    }

    pub fn to_record(&self) -> ValueRecord {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), Value::Instance(v.clone())))
            .collect()
    }

    pub fn to_json(&self) -> StruxResult<String> {
        json::encode(&Value::Record(self.to_record()))
    }
}

impl Normalize for ClsDict {
    fn to_plain(&self) -> Value {
        Value::Record(self.to_record())
    }
}
