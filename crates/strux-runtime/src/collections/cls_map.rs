//! Class-coercing map with typed keys

use crate::class::{ClassRef, Instance};
use crate::coerce::to_instance;
use crate::error::StruxResult;
use crate::value::Value;
use indexmap::IndexMap;
use std::hash::Hash;

/// Insertion-ordered map from `K` to exact instances of one class.
/// Keys are stored as given.
#[derive(Debug, Clone)]
pub struct ClsMap<K> {
    class: ClassRef,
    entries: IndexMap<K, Instance>,
}

impl<K: Hash + Eq> ClsMap<K> {
    pub fn new(class: &ClassRef) -> Self {
        Self {
            class: class.clone(),
            entries: IndexMap::new(),
        }
    }

    /// Build from initial entries, each value coerced as `set` would
    pub fn from_entries(
        class: &ClassRef,
        entries: impl IntoIterator<Item = (K, Value)>,
    ) -> StruxResult<Self> {
        let mut map = Self::new(class);
        for (key, value) in entries {
            map.set(key, value)?;
        }
        Ok(map)
    }

    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// Coerce `value` and store it under `key`, replacing in place
    pub fn set(&mut self, key: K, value: Value) -> StruxResult<&mut Self> {
        let item = to_instance(value, &self.class)?;
        self.entries.insert(key, item);
        Ok(self)
    }

    pub fn get(&self, key: &K) -> Option<&Instance> {
        self.entries.get(key)
    }

    pub fn has(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn delete(&mut self, key: &K) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, K, Instance> {
        self.entries.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, K, Instance> {
        self.entries.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, K, Instance> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;

    #[test]
    fn test_keys_are_not_coerced() {
        let obj = Class::record("Obj").build();
        let mut map: ClsMap<u32> = ClsMap::new(&obj);
        map.set(7, Value::record([("one", Value::from(1))])).unwrap();

        assert!(map.has(&7));
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![7]);
        assert_eq!(map.get(&7).unwrap().get("one"), Some(Value::from(1)));
        assert!(map.delete(&7));
        assert!(!map.delete(&7));
    }
}
