//! Structural-key dictionary
//!
//! [`EqDict`] stores each entry under the canonical key of its logical key,
//! so deeply equal keys hit the same entry no matter how their records were
//! built. Stored names double as the dictionary's own enumerable properties:
//! the plain-record form of a dictionary is exactly its storage, and decoding
//! a stored name gives back an equivalent logical key.
//!
//! A name that already resolves to something other than an entry (a member
//! declared by the dictionary's class, or a hidden own property) is never
//! overwritten:
//!
//! - `set` fails with [`StruxError::KeyConflict`]
//! - `delete` reports `false` and leaves it alone

use crate::assign::MissingSource;
use crate::class::{Class, ClassBuilder, ClassRef};
use crate::error::{StruxError, StruxResult};
use crate::json;
use crate::keys::{KeyStabilizer, Normalize};
use crate::policy::Policy;
use crate::predicates::is_nil;
use crate::value::{Value, ValueRecord};
use indexmap::IndexMap;

thread_local! {
    static BASE_CLASS: ClassRef = Class::builder("EqDict")
        .method("has")
        .method("get")
        .method("set")
        .method("delete")
        .method("hasRaw")
        .method("getRaw")
        .method("setRaw")
        .method("deleteRaw")
        .method("forEach")
        .method("keys")
        .method("values")
        .method("entries")
        .build();
}

#[derive(Debug, Clone)]
pub struct EqDict {
    class: ClassRef,
    /// Own enumerable properties, keyed by canonical key
    entries: IndexMap<String, Value>,
    /// Own non-enumerable properties
    hidden: IndexMap<String, Value>,
    stabilizer: KeyStabilizer,
    missing_source: MissingSource,
}

impl Default for EqDict {
    fn default() -> Self {
        Self::new()
    }
}

impl EqDict {
    /// The class every dictionary class extends
    pub fn base_class() -> ClassRef {
        BASE_CLASS.with(ClassRef::clone)
    }

    /// Start a dictionary subclass; declared members become reserved names
    pub fn subclass(name: impl Into<String>) -> ClassBuilder {
        Class::builder(name).extends(&Self::base_class())
    }

    pub fn new() -> Self {
        Self {
            class: Self::base_class(),
            entries: IndexMap::new(),
            hidden: IndexMap::new(),
            stabilizer: KeyStabilizer::default(),
            missing_source: MissingSource::default(),
        }
    }

    /// An empty dictionary of a dictionary subclass
    pub fn with_class(class: &ClassRef) -> StruxResult<Self> {
        if !class.is_subclass_of(&Self::base_class()) {
            return Err(StruxError::TypeMismatch {
                value: class.name().to_string(),
                test: "subclass of EqDict".to_string(),
            });
        }
        Ok(Self {
            class: class.clone(),
            ..Self::new()
        })
    }

    pub fn with_policy(mut self, policy: &Policy) -> Self {
        self.stabilizer = KeyStabilizer::from_policy(policy);
        self.missing_source = policy.missing_source;
        self
    }

    /// Load a plain record of canonical keys, as produced by [`EqDict::to_record`]
    pub fn from_record(value: &Value) -> StruxResult<Self> {
        Self::new().load_record(value)
    }

    pub fn from_json(text: &str) -> StruxResult<Self> {
        Self::new().load_json(text)
    }

    /// Fill a freshly configured dictionary from a plain record, keeping its
    /// class and settings:
    ///
    /// ```
    /// use strux_runtime::{EqDict, Value};
    ///
    /// let class = EqDict::subclass("Registry").method("lookup").build();
    /// let dict = EqDict::with_class(&class)
    ///     .unwrap()
    ///     .load_json(r#"{"\"one\"":10,"lookup":20}"#)
    ///     .unwrap();
    /// assert_eq!(dict.class(), &class);
    /// assert_eq!(dict.get(&Value::from("one")).unwrap(), Some(&Value::from(10)));
    /// assert_eq!(dict.len(), 1);
    /// ```
    pub fn load_record(mut self, value: &Value) -> StruxResult<Self> {
        self.assign(value)?;
        Ok(self)
    }

    pub fn load_json(self, text: &str) -> StruxResult<Self> {
        self.load_record(&json::decode(text)?)
    }

    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// Copy a record's fields in as entries, skipping names that would
    /// shadow a member. Nil is a no-op unless the policy rejects it.
    pub fn assign(&mut self, source: &Value) -> StruxResult<&mut Self> {
        let fields = match source {
            v if is_nil(v) && self.missing_source == MissingSource::Ignore => return Ok(self),
            Value::Record(fields) => fields,
            other => return Err(StruxError::mismatch(other, "is_record")),
        };
        for (name, value) in fields.iter() {
            if self.has_raw(name) || !self.has_property(name) {
                self.entries.insert(name.clone(), value.clone());
            } else {
                tracing::trace!(field = %name, "skipping field shadowing a member");
            }
        }
        Ok(self)
    }

    /// Canonical key of a logical key, under this dictionary's settings
    pub fn key_of<K: Normalize + ?Sized>(&self, key: &K) -> StruxResult<String> {
        self.stabilizer.key(key)
    }

    pub fn has<K: Normalize + ?Sized>(&self, key: &K) -> StruxResult<bool> {
        Ok(self.has_raw(&self.key_of(key)?))
    }

    pub fn get<K: Normalize + ?Sized>(&self, key: &K) -> StruxResult<Option<&Value>> {
        let raw = self.key_of(key)?;
        Ok(self.get_raw(&raw))
    }

    pub fn set<K: Normalize + ?Sized>(&mut self, key: &K, value: Value) -> StruxResult<&mut Self> {
        let raw = self.key_of(key)?;
        self.set_raw(raw, value)
    }

    pub fn delete<K: Normalize + ?Sized>(&mut self, key: &K) -> StruxResult<bool> {
        let raw = self.key_of(key)?;
        Ok(self.delete_raw(&raw))
    }

    /// True only for entries: hidden properties and members do not count
    pub fn has_raw(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn set_raw(&mut self, key: impl Into<String>, value: Value) -> StruxResult<&mut Self> {
        let key = key.into();
        if !self.has_raw(&key) {
            if let Some(existing) = self.property(&key) {
                tracing::debug!(class = self.class.name(), key = %key, "key conflicts with a property");
                return Err(StruxError::KeyConflict {
                    key: Value::string(&key).to_string(),
                    existing: existing.to_string(),
                });
            }
        }
        self.entries.insert(key, value);
        Ok(self)
    }

    /// Remove an entry. Returns false when there is none, including when the
    /// name belongs to a member or hidden property.
    pub fn delete_raw(&mut self, key: &str) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    /// Define an own non-enumerable property
    pub fn define_hidden(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        let name = name.into();
        self.entries.shift_remove(&name);
        self.hidden.insert(name, value);
        self
    }

    /// Full property lookup: entries, hidden properties, then class members
    pub fn property(&self, name: &str) -> Option<Value> {
        self.entries
            .get(name)
            .or_else(|| self.hidden.get(name))
            .cloned()
            .or_else(|| self.class.member(name))
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.entries.contains_key(name)
            || self.hidden.contains_key(name)
            || self.class.has_member(name)
    }

    /// Stored names in property enumeration order: array-index names in
    /// ascending numeric order, then every other name in insertion order
    pub fn raw_keys(&self) -> Vec<&str> {
        let mut indexed: Vec<(u32, &str)> = Vec::new();
        let mut named: Vec<&str> = Vec::new();
        for key in self.entries.keys() {
            match array_index(key) {
                Some(index) => indexed.push((index, key)),
                None => named.push(key),
            }
        }
        indexed.sort_unstable_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, key)| key).chain(named).collect()
    }

    /// Logical keys, decoded from the stored names
    pub fn keys(&self) -> impl Iterator<Item = StruxResult<Value>> + '_ {
        self.raw_keys().into_iter().map(decode_key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.raw_keys()
            .into_iter()
            .filter_map(move |key| self.entries.get(key))
    }

    pub fn entries(&self) -> impl Iterator<Item = StruxResult<(Value, &Value)>> + '_ {
        self.raw_keys().into_iter().filter_map(move |key| {
            let value = self.entries.get(key)?;
            Some(decode_key(key).map(|logical| (logical, value)))
        })
    }

    /// Visit `(value, logical key)` in enumeration order
    pub fn for_each(&self, mut visit: impl FnMut(&Value, Value)) -> StruxResult<()> {
        for entry in self.entries() {
            let (key, value) = entry?;
            visit(value, key);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The storage as a plain record of canonical keys
    pub fn to_record(&self) -> ValueRecord {
        self.raw_keys()
            .into_iter()
            .filter_map(|key| {
                self.entries
                    .get(key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect()
    }

    pub fn to_json(&self) -> StruxResult<String> {
        json::encode(&Value::Record(self.to_record()))
    }
}

impl Normalize for EqDict {
    fn to_plain(&self) -> Value {
        Value::Record(self.to_record())
    }
}

impl PartialEq for EqDict {
    /// Same canonical-key to value pairs; order, class and hidden
    /// properties are ignored
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

fn decode_key(key: &str) -> StruxResult<Value> {
    json::decode(key).map_err(|e| StruxError::InvalidKey {
        key: key.to_string(),
        reason: match e {
            StruxError::Decode { reason, .. } => reason,
            other => other.to_string(),
        },
    })
}

/// Canonical array index: `0`, or digits without a leading zero below 2^32 - 1
fn array_index(name: &str) -> Option<u32> {
    if name.is_empty() || (name.len() > 1 && name.starts_with('0')) {
        return None;
    }
    if !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse::<u32>().ok().filter(|index| *index != u32::MAX)
}
