//! Instance coercion
//!
//! Given a raw value and a class, produce an instance of that class. Values
//! that already are instances pass through untouched; everything else is
//! handed to the class constructor, which owns all shape validation.

use crate::class::{ClassRef, Instance};
use crate::error::StruxResult;
use crate::predicates::is_nil;
use crate::value::Value;

/// Coerce to an exact instance of `class`.
///
/// An instance of a superclass or subclass is reconstructed, so the result's
/// own class is always exactly `class`.
pub fn to_instance(value: Value, class: &ClassRef) -> StruxResult<Instance> {
    if let Value::Instance(inst) = &value {
        if inst.is_exact(class) {
            return Ok(inst.clone());
        }
    }
    construct(value, class)
}

/// Coerce to an instance of `class` or of any subclass of it
pub fn to_instance_lenient(value: Value, class: &ClassRef) -> StruxResult<Instance> {
    if let Value::Instance(inst) = &value {
        if inst.is_a(class) {
            return Ok(inst.clone());
        }
    }
    construct(value, class)
}

/// Like [`to_instance`], but undefined and null pass through unchanged
pub fn to_instance_opt(value: Value, class: &ClassRef) -> StruxResult<Value> {
    if is_nil(&value) {
        return Ok(value);
    }
    to_instance(value, class).map(Value::Instance)
}

fn construct(value: Value, class: &ClassRef) -> StruxResult<Instance> {
    tracing::trace!(class = class.name(), from = value.type_name(), "constructing instance");
    class.construct(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;

    #[test]
    fn test_instantiate_from_record() {
        let class = Class::builder("Mock").build();
        let inst = to_instance(Value::record(Vec::<(String, Value)>::new()), &class).unwrap();
        assert!(inst.is_exact(&class));
    }

    #[test]
    fn test_preserve_pre_instantiated() {
        let class = Class::builder("Mock").build();
        let val = class.construct(Value::Undefined).unwrap();

        let once = to_instance(Value::Instance(val.clone()), &class).unwrap();
        let twice = to_instance(Value::Instance(once.clone()), &class).unwrap();
        assert!(once.ptr_eq(&val));
        assert!(twice.ptr_eq(&val));
    }

    #[test]
    fn test_upgrade_to_subclass() {
        let sup = Class::builder("Sup").build();
        let sub = Class::builder("Sub").extends(&sup).build();
        let old = sup.construct(Value::Undefined).unwrap();

        let upgraded = to_instance(Value::Instance(old.clone()), &sub).unwrap();
        assert!(upgraded.is_exact(&sub));
        assert!(!upgraded.ptr_eq(&old));
    }

    #[test]
    fn test_lenient_accepts_subclass() {
        let sup = Class::builder("Sup").build();
        let sub = Class::builder("Sub").extends(&sup).build();
        let child = sub.construct(Value::Undefined).unwrap();

        let kept = to_instance_lenient(Value::Instance(child.clone()), &sup).unwrap();
        assert!(kept.ptr_eq(&child));

        let rebuilt = to_instance(Value::Instance(child.clone()), &sup).unwrap();
        assert!(!rebuilt.ptr_eq(&child));
        assert!(rebuilt.is_exact(&sup));
    }

    #[test]
    fn test_opt_passes_nil_through() {
        let class = Class::builder("Mock")
            .init(|this, arg| {
                this.set("val", arg);
                Ok(())
            })
            .build();

        assert_eq!(to_instance_opt(Value::Null, &class).unwrap(), Value::Null);
        assert_eq!(
            to_instance_opt(Value::Undefined, &class).unwrap(),
            Value::Undefined
        );

        let wrapped = to_instance_opt(Value::from(10), &class).unwrap();
        let inst = wrapped.as_instance().unwrap();
        assert!(inst.is_exact(&class));
        assert_eq!(inst.get("val"), Some(Value::from(10)));
    }

    #[test]
    fn test_constructor_errors_propagate() {
        let obj = Class::record("Obj").build();
        for bad in [Value::Null, Value::from("one"), Value::from(10), Value::array(vec![])] {
            assert!(to_instance(bad, &obj).unwrap_err().is_type_mismatch());
        }
    }
}
