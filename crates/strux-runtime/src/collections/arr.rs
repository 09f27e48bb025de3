//! Base sequence
//!
//! [`Arr`] is the plain sequence the class-coercing [`ClsArr`](super::ClsArr)
//! builds on. Its runtime constructor takes at most one argument:
//!
//! - nothing, undefined or null: an empty sequence
//! - a number: that many undefined slots
//! - an array or a string: its elements, spread in order

use crate::error::{StruxError, StruxResult};
use crate::keys::Normalize;
use crate::predicates::is_nil;
use crate::value::Value;
use std::ops::Index;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arr {
    items: Vec<Value>,
}

impl Arr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct from a runtime argument list of length 0 or 1
    pub fn from_args(args: &[Value]) -> StruxResult<Self> {
        StruxError::check_arg_count(args.len(), 0, 1)?;
        match args.first() {
            Some(arg) => Self::from_value(arg),
            None => Ok(Self::new()),
        }
    }

    /// Construct from a single runtime argument
    pub fn from_value(value: &Value) -> StruxResult<Self> {
        match value {
            v if is_nil(v) => Ok(Self::new()),
            Value::Number(len) => Self::with_len(*len),
            Value::String(text) => Ok(text.chars().map(|c| Value::from(c.to_string())).collect()),
            Value::Array(items) => Ok(items.iter().cloned().collect()),
            other => Err(StruxError::mismatch(other, "is_iterable")),
        }
    }

    /// `len` undefined slots; `len` must be a valid array length
    fn with_len(len: f64) -> StruxResult<Self> {
        if len.fract() != 0.0 || len < 0.0 || len > f64::from(u32::MAX) {
            return Err(StruxError::mismatch(&Value::Number(len), "is_array_length"));
        }
        Ok(Self {
            items: vec![Value::Undefined; len as usize],
        })
    }

    pub fn push(&mut self, value: Value) -> &mut Self {
        self.items.push(value);
        self
    }

    /// Map every `(value, index)` into a new sequence
    pub fn map(&self, mut f: impl FnMut(&Value, usize) -> Value) -> Arr {
        self.items
            .iter()
            .enumerate()
            .map(|(index, value)| f(value, index))
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    pub fn to_value(&self) -> Value {
        Value::array(self.items.clone())
    }
}

impl Normalize for Arr {
    fn to_plain(&self) -> Value {
        self.to_value()
    }
}

impl FromIterator<Value> for Arr {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for Arr {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.items[index]
    }
}

impl IntoIterator for Arr {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Arr {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
