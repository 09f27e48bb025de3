//! Runtime value representation
//!
//! Values mirror the object runtime the collections serve:
//! - Undefined, Null, Bools, Numbers: immediate values
//! - Strings: reference-counted, immutable
//! - Arrays and Records: copy-on-write, value semantics
//! - Instances and Functions: reference semantics, compared by identity

use crate::class::Instance;
use crate::error::StruxResult;
use crate::json;
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// Copy-on-write array. Cheap to clone (refcount bump).
/// Mutations on a shared array clone the inner Vec first (Rc::make_mut).
#[derive(Clone, Debug, Default)]
pub struct ValueArray(Rc<Vec<Value>>);

impl ValueArray {
    pub fn new() -> Self {
        ValueArray(Rc::new(Vec::new()))
    }

    pub fn from_vec(v: Vec<Value>) -> Self {
        ValueArray(Rc::new(v))
    }

    /// Borrow the elements
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Append, cloning the storage first if it is shared
    pub fn push(&mut self, value: Value) {
        Rc::make_mut(&mut self.0).push(value);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// True when both handles point at the same allocation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ValueArray {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice() == other.0.as_slice()
    }
}

impl std::ops::Index<usize> for ValueArray {
    type Output = Value;
    fn index(&self, index: usize) -> &Value {
        &self.0[index]
    }
}

impl From<Vec<Value>> for ValueArray {
    fn from(v: Vec<Value>) -> Self {
        ValueArray::from_vec(v)
    }
}

impl FromIterator<Value> for ValueArray {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        ValueArray(Rc::new(iter.into_iter().collect()))
    }
}

/// Copy-on-write record: an insertion-ordered, string-keyed bag of fields
/// with no behaviour of its own.
#[derive(Clone, Debug, Default)]
pub struct ValueRecord(Rc<IndexMap<String, Value>>);

impl ValueRecord {
    pub fn new() -> Self {
        ValueRecord(Rc::new(IndexMap::new()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        Rc::make_mut(&mut self.0).insert(key.into(), value);
    }

    /// Remove a field, keeping the order of the others
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        Rc::make_mut(&mut self.0).shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ValueRecord {
    /// Field sets compare regardless of insertion order
    fn eq(&self, other: &Self) -> bool {
        self.0.as_ref() == other.0.as_ref()
    }
}

impl From<IndexMap<String, Value>> for ValueRecord {
    fn from(m: IndexMap<String, Value>) -> Self {
        ValueRecord(Rc::new(m))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ValueRecord {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        ValueRecord(Rc::new(
            iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }
}

/// Native function type - Rust closure callable from the runtime
pub type NativeFn = Rc<dyn Fn(&[Value]) -> StruxResult<Value>>;

/// Named callable with reference identity
#[derive(Clone)]
pub struct Callable {
    name: Rc<str>,
    func: NativeFn,
}

impl Callable {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&[Value]) -> StruxResult<Value> + 'static,
    ) -> Self {
        Callable {
            name: Rc::from(name.into()),
            func: Rc::new(func),
        }
    }

    /// A callable that does nothing; stands in for declared methods
    pub fn named(name: impl Into<String>) -> Self {
        Callable::new(name, |_| Ok(Value::Undefined))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> StruxResult<Value> {
        (self.func)(args)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({})", self.name)
    }
}

/// Runtime value type
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value; encodes to nothing
    #[default]
    Undefined,
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (IEEE 754 double-precision)
    Number(f64),
    /// String value (reference-counted, immutable)
    String(Rc<str>),
    /// Array value (copy-on-write, value semantics)
    Array(ValueArray),
    /// Plain record (copy-on-write, value semantics)
    Record(ValueRecord),
    /// Class instance (reference semantics)
    Instance(Instance),
    /// Callable (reference semantics)
    Function(Callable),
}

impl Value {
    /// Create a new string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Create a new array value
    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(ValueArray::from_vec(values))
    }

    /// Create a new record value, fields kept in the given order
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Record(fields.into_iter().collect())
    }

    /// Create a new callable value
    pub fn function(
        name: impl Into<String>,
        func: impl Fn(&[Value]) -> StruxResult<Value> + 'static,
    ) -> Self {
        Value::Function(Callable::new(name, func))
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
            Value::Instance(inst) => inst.class().name(),
            Value::Function(_) => "function",
        }
    }

    /// Identity comparison.
    ///
    /// Primitives compare by value (`NaN` is the same as `NaN`, `0` is not
    /// the same as `-0`); everything else compares by allocation.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                (a.is_nan() && b.is_nan()) || (a == b && a.is_sign_negative() == b.is_sign_negative())
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Record(a), Value::Record(b)) => a.ptr_eq(b),
            (Value::Instance(a), Value::Instance(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ValueArray> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&ValueRecord> {
        match self {
            Value::Record(rec) => Some(rec),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(inst) => Some(inst),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Equality contract:
    ///
    /// - Undefined, Null, Bool, Number, String: primitive equality
    /// - Array, Record: deep content equality (record field order ignored)
    /// - Instance, Function: identity
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Printable form used in diagnostics
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", json::format_number(*n)),
            Value::String(_) | Value::Array(_) | Value::Record(_) => match json::encode(self) {
                Ok(text) => write!(f, "{}", text),
                Err(_) => write!(f, "[{}]", self.type_name()),
            },
            Value::Instance(inst) => write!(f, "[object {}]", inst.class().name()),
            Value::Function(func) => write!(f, "{}", func.name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Array(arr) => write!(f, "Array({:?})", arr.as_slice()),
            Value::Record(rec) => f.debug_map().entries(rec.iter()).finish(),
            Value::Instance(inst) => write!(f, "{:?}", inst),
            Value::Function(func) => write!(f, "Function({})", func.name()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::array(values)
    }
}

impl From<ValueRecord> for Value {
    fn from(rec: ValueRecord) -> Self {
        Value::Record(rec)
    }
}

impl From<Instance> for Value {
    fn from(inst: Instance) -> Self {
        Value::Instance(inst)
    }
}

impl From<Callable> for Value {
    fn from(func: Callable) -> Self {
        Value::Function(func)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_primitives() {
        assert_eq!(Value::Undefined.to_string(), "undefined");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_display_structures_as_json() {
        assert_eq!(Value::string("one").to_string(), r#""one""#);
        let rec = Value::record([("two", Value::from(2)), ("one", Value::from(1))]);
        assert_eq!(rec.to_string(), r#"{"two":2,"one":1}"#);
        assert_eq!(
            Value::array(vec![Value::from(1), Value::Null]).to_string(),
            "[1,null]"
        );
    }

    #[test]
    fn test_display_function_by_name() {
        let func = Value::function("effect", |_| Ok(Value::Undefined));
        assert_eq!(func.to_string(), "effect");
    }

    #[test]
    fn test_record_equality_ignores_order() {
        let a = Value::record([("one", Value::from(10)), ("two", Value::from(20))]);
        let b = Value::record([("two", Value::from(20)), ("one", Value::from(10))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_record_cow_mutation_independent() {
        let original = ValueRecord::from_iter([("one", Value::from(1))]);
        let mut copy = original.clone();
        copy.insert("two", Value::from(2));

        assert_eq!(original.len(), 1);
        assert_eq!(copy.len(), 2);
        assert!(!original.ptr_eq(&copy));
    }

    #[test]
    fn test_same_is_identity() {
        assert!(Value::Number(f64::NAN).same(&Value::Number(f64::NAN)));
        assert!(!Value::Number(0.0).same(&Value::Number(-0.0)));

        let arr = Value::array(vec![]);
        assert!(arr.same(&arr.clone()));
        assert!(!arr.same(&Value::array(vec![])));
        assert_eq!(arr, Value::array(vec![]));
    }

    #[test]
    fn test_functions_compare_by_identity() {
        let a = Callable::named("nop");
        let b = Callable::named("nop");
        assert_eq!(Value::from(a.clone()), Value::from(a.clone()));
        assert_ne!(Value::from(a), Value::from(b));
    }
}
