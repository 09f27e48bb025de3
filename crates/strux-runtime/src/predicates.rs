//! Value classification predicates
//!
//! Pure and total; everything else in the crate builds on these.

use crate::class::ClassRef;
use crate::value::Value;

/// Undefined or null
pub fn is_nil(value: &Value) -> bool {
    matches!(value, Value::Undefined | Value::Null)
}

pub fn is_some(value: &Value) -> bool {
    !is_nil(value)
}

/// Objects and callables
pub fn is_composite(value: &Value) -> bool {
    matches!(
        value,
        Value::Array(_) | Value::Record(_) | Value::Instance(_) | Value::Function(_)
    )
}

pub fn is_primitive(value: &Value) -> bool {
    !is_composite(value)
}

pub fn is_callable(value: &Value) -> bool {
    matches!(value, Value::Function(_))
}

/// Plain key/value bag: no arrays, no class instances
pub fn is_record(value: &Value) -> bool {
    matches!(value, Value::Record(_))
}

pub fn is_sequence(value: &Value) -> bool {
    matches!(value, Value::Array(_))
}

/// An object that is not a sequence: eligible as assignment target or source
pub fn is_struct_like(value: &Value) -> bool {
    matches!(value, Value::Record(_) | Value::Instance(_))
}

/// The value's own class is exactly `class`, not a subclass of it
pub fn is_exact_instance_of(value: &Value, class: &ClassRef) -> bool {
    match value {
        Value::Instance(inst) => inst.is_exact(class),
        _ => false,
    }
}

/// The value is an instance of `class` or of one of its subclasses
pub fn is_instance_of(value: &Value, class: &ClassRef) -> bool {
    match value {
        Value::Instance(inst) => inst.is_a(class),
        _ => false,
    }
}

/// Primitives, and records/sequences made only of plain values
pub fn is_plain_value(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().all(is_plain_value),
        Value::Record(fields) => fields.values().all(is_plain_value),
        other => is_primitive(other),
    }
}
