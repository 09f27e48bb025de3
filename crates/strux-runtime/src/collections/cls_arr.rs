//! Class-coercing sequence

use super::{insert_batch, Arr, BatchMode};
use crate::class::{ClassRef, Instance};
use crate::coerce::to_instance;
use crate::error::StruxResult;
use crate::keys::Normalize;
use crate::policy::Policy;
use crate::value::Value;
use std::ops::Index;

/// A sequence whose elements are all exact instances of one class
#[derive(Debug, Clone)]
pub struct ClsArr {
    class: ClassRef,
    items: Vec<Instance>,
    batch: BatchMode,
}

impl ClsArr {
    pub fn new(class: &ClassRef) -> Self {
        Self::with_policy(class, &Policy::default())
    }

    pub fn with_policy(class: &ClassRef, policy: &Policy) -> Self {
        Self {
            class: class.clone(),
            items: Vec::new(),
            batch: policy.batch,
        }
    }

    /// Build from initial values, each coerced as `push` would
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
        let mut arr = Self::with_policy(class, policy);
        arr.push_all(values)?;
        Ok(arr)
    }

    /// Runtime constructor: the arguments [`Arr::from_args`] accepts, with
    /// every resulting element coerced. A length gives that many instances
    /// constructed from undefined.
    pub fn from_args(class: &ClassRef, args: &[Value]) -> StruxResult<Self> {
        Self::from_args_with(class, &Policy::default(), args)
    }

    pub fn from_args_with(class: &ClassRef, policy: &Policy, args: &[Value]) -> StruxResult<Self> {
        Self::from_values_with(class, policy, Arr::from_args(args)?)
    }

    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    pub fn push(&mut self, value: Value) -> StruxResult<&mut Self> {
        let item = to_instance(value, &self.class)?;
        self.items.push(item);
        Ok(self)
    }

    /// Append several values, keeping call order
    pub fn push_all(&mut self, values: impl IntoIterator<Item = Value>) -> StruxResult<&mut Self> {
        let items = &mut self.items;
        insert_batch(self.batch, &self.class, values, |item| items.push(item))?;
        Ok(self)
    }

    pub fn unshift(&mut self, value: Value) -> StruxResult<&mut Self> {
        let item = to_instance(value, &self.class)?;
        self.items.insert(0, item);
        Ok(self)
    }

    /// Prepend several values as one block: `unshift_all([a, b])` on `[c]`
    /// gives `[a, b, c]`.
    pub fn unshift_all(
        &mut self,
        values: impl IntoIterator<Item = Value>,
    ) -> StruxResult<&mut Self> {
        let items = &mut self.items;
        let mut at = 0;
        insert_batch(self.batch, &self.class, values, |item| {
            items.insert(at, item);
            at += 1;
        })?;
        Ok(self)
    }

    pub fn get(&self, index: usize) -> Option<&Instance> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instance> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Instance] {
        &self.items
    }

    /// The elements as a plain sequence
    pub fn to_arr(&self) -> Arr {
        self.items.iter().cloned().map(Value::Instance).collect()
    }

    /// The elements as a runtime array
    pub fn to_value(&self) -> Value {
        Value::array(self.items.iter().cloned().map(Value::Instance).collect())
    }
}

impl Normalize for ClsArr {
    fn to_plain(&self) -> Value {
        self.to_value()
    }
}

impl Index<usize> for ClsArr {
    type Output = Instance;

    fn index(&self, index: usize) -> &Instance {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a ClsArr {
    type Item = &'a Instance;
    type IntoIter = std::slice::Iter<'a, Instance>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;

    fn tagged() -> ClassRef {
        Class::builder("Tagged")
            .init(|this, arg| {
                this.set("tag", arg);
                Ok(())
            })
            .build()
    }

    fn tags(arr: &ClsArr) -> Vec<Value> {
        arr.iter().map(|i| i.get("tag").unwrap_or_default()).collect()
    }

    #[test]
    fn test_push_coerces() {
        let class = tagged();
        let mut arr = ClsArr::new(&class);
        arr.push(Value::from(1)).unwrap();
        assert!(arr[0].is_exact(&class));
        assert_eq!(tags(&arr), vec![Value::from(1)]);
    }

    #[test]
    fn test_unshift_all_keeps_argument_order() {
        let class = tagged();
        let mut arr = ClsArr::from_values(&class, [Value::from(3)]).unwrap();
        arr.unshift_all([Value::from(1), Value::from(2)]).unwrap();
        arr.unshift(Value::from(0)).unwrap();
        assert_eq!(
            tags(&arr),
            vec![Value::from(0), Value::from(1), Value::from(2), Value::from(3)]
        );
    }
}
