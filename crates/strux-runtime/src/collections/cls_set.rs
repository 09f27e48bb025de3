//! Class-coercing set
//!
//! Membership is by instance identity, so two structurally equal instances
//! are distinct members.

use super::{insert_batch, BatchMode};
use crate::class::{ClassRef, Instance};
use crate::coerce::to_instance;
use crate::error::StruxResult;
use crate::policy::Policy;
use crate::value::Value;
use indexmap::IndexSet;

#[derive(Debug, Clone)]
pub struct ClsSet {
    class: ClassRef,
    items: IndexSet<Instance>,
    batch: BatchMode,
}

impl ClsSet {
    pub fn new(class: &ClassRef) -> Self {
        Self::with_policy(class, &Policy::default())
    }

    pub fn with_policy(class: &ClassRef, policy: &Policy) -> Self {
        Self {
            class: class.clone(),
            items: IndexSet::new(),
            batch: policy.batch,
        }
    }

    pub fn from_values(
        class: &ClassRef,
        values: impl IntoIterator<Item = Value>,
    ) -> StruxResult<Self> {
        Self::from_values_with(class, &Policy::default(), values)
    }

    pub fn from_values_with(
        class: &ClassRef,
        policy: &Policy,
        values: impl IntoIterator<Item = Value>,
    ) -> StruxResult<Self> {
        let mut set = Self::with_policy(class, policy);
        set.add_all(values)?;
        Ok(set)
    }

    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// Coerce and insert; an instance already present is kept in place
    pub fn add(&mut self, value: Value) -> StruxResult<&mut Self> {
        let item = to_instance(value, &self.class)?;
        self.items.insert(item);
        Ok(self)
    }

    pub fn add_all(&mut self, values: impl IntoIterator<Item = Value>) -> StruxResult<&mut Self> {
        let items = &mut self.items;
        insert_batch(self.batch, &self.class, values, |item| {
            items.insert(item);
        })?;
        Ok(self)
    }

    pub fn contains(&self, item: &Instance) -> bool {
        self.items.contains(item)
    }

    pub fn delete(&mut self, item: &Instance) -> bool {
        self.items.shift_remove(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> indexmap::set::Iter<'_, Instance> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a ClsSet {
    type Item = &'a Instance;
    type IntoIter = indexmap::set::Iter<'a, Instance>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
