//! Shared test utilities
//!
//! Mock classes and value shorthands used across the integration tests.

#![allow(dead_code)]

use strux_runtime::{Callable, Class, ClassRef, Value};
use std::cell::Cell;
use std::rc::Rc;

// Re-export testing utilities
pub use pretty_assertions::{assert_eq, assert_ne};

/// A value-object class: the constructor requires a record or instance
pub fn mock_class() -> ClassRef {
    Class::record("Mock").build()
}

/// Empty record
pub fn rec0() -> Value {
    Value::record(Vec::<(String, Value)>::new())
}

/// Record from `(name, number)` pairs, in the given order
pub fn rec(fields: &[(&str, i32)]) -> Value {
    Value::record(fields.iter().map(|(k, v)| (*k, Value::from(*v))))
}

/// A callable that does nothing
pub fn nop() -> Value {
    Value::function("nop", |_| Ok(Value::Undefined))
}

/// Inputs every value-object constructor rejects
pub fn rejected_inputs() -> Vec<Value> {
    vec![
        Value::Null,
        Value::from("one"),
        Value::from(10),
        nop(),
        Value::array(vec![]),
    ]
}

/// A callable that bumps `count` each time it runs
pub fn counter(name: &str, count: &Rc<Cell<u32>>) -> Callable {
    let count = count.clone();
    Callable::new(name, move |_| {
        count.set(count.get() + 1);
        Ok(Value::Undefined)
    })
}
