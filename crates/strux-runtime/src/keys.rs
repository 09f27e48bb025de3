//! Canonical key stabilization
//!
//! Turns an arbitrary value into a deterministic string that only depends on
//! its deep structure. Record fields are sorted so two records with the same
//! field set produce the same key regardless of insertion order.
//!
//! # Examples
//!
//! ```
//! use strux_runtime::keys::stabilize_key;
//! use strux_runtime::value::Value;
//!
//! let a = Value::record([("one", Value::from(10)), ("two", Value::from(20))]);
//! let b = Value::record([("two", Value::from(20)), ("one", Value::from(10))]);
//! assert_eq!(stabilize_key(&a).unwrap(), r#"{"one":10,"two":20}"#);
//! assert_eq!(stabilize_key(&a).unwrap(), stabilize_key(&b).unwrap());
//! ```

use crate::class::Instance;
use crate::error::{StruxError, StruxResult};
use crate::json;
use crate::policy::Policy;
use crate::predicates::is_plain_value;
use crate::value::{Value, ValueRecord};
use std::cmp::Ordering;
use strux_config::project::DEFAULT_MAX_REDUCE_STEPS;

/// Capability to reduce a value to a plainer form of itself.
///
/// Returning a value that is [`Value::same`] as the input means "no further
/// reduction"; the stabilizer applies the hook until that happens.
pub trait Normalize {
    fn to_plain(&self) -> Value;

    /// The receiver as a runtime value, for types that already are one.
    /// Their first `to_plain` then counts as a reduction step.
    fn as_value(&self) -> Option<Value> {
        None
    }
}

impl Normalize for Value {
    fn to_plain(&self) -> Value {
        match self {
            Value::Instance(inst) => inst.to_plain(),
            other => other.clone(),
        }
    }

    fn as_value(&self) -> Option<Value> {
        Some(self.clone())
    }
}

impl Normalize for Instance {
    fn to_plain(&self) -> Value {
        match self.class().plain_hook() {
            Some(hook) => hook(self),
            None => Value::Instance(self.clone()),
        }
    }

    fn as_value(&self) -> Option<Value> {
        Some(Value::Instance(self.clone()))
    }
}

/// Key stabilizer with a bounded reduction loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStabilizer {
    max_reduce_steps: usize,
}

impl Default for KeyStabilizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REDUCE_STEPS)
    }
}

impl KeyStabilizer {
    pub fn new(max_reduce_steps: usize) -> Self {
        Self {
            max_reduce_steps: max_reduce_steps.max(1),
        }
    }

    pub fn from_policy(policy: &Policy) -> Self {
        Self::new(policy.max_reduce_steps)
    }

    /// Canonical key of `value`
    pub fn key<T: Normalize + ?Sized>(&self, value: &T) -> StruxResult<String> {
        let start = value.as_value().unwrap_or_else(|| value.to_plain());
        let stable = self.stabilize(start)?;
        json::encode(&stable)
    }

    /// Reduce, then order-normalize `value` into a plain structure
    pub fn stabilize(&self, value: Value) -> StruxResult<Value> {
        self.stabilize_in(value, &mut Vec::new())
    }

    /// `stack` holds the instances reduced on the way down to `value`; one
    /// of them showing up again means the plain form contains itself.
    fn stabilize_in(&self, value: Value, stack: &mut Vec<Instance>) -> StruxResult<Value> {
        let depth = stack.len();
        let reduced = self.reduce(value, stack)?;
        let stable = match reduced {
            Value::Function(_) => Ok(Value::Null),
            Value::Array(items) => items
                .iter()
                .map(|item| self.stabilize_in(item.clone(), stack))
                .collect::<StruxResult<Vec<_>>>()
                .map(Value::array),
            Value::Record(fields) => {
                let mut names: Vec<&String> = fields.keys().collect();
                names.sort_by(|a, b| compare_names(a, b));

                let mut out = ValueRecord::new();
                for name in names {
                    if let Some(field) = fields.get(name) {
                        out.insert(name.clone(), self.stabilize_in(field.clone(), stack)?);
                    }
                }
                Ok(Value::Record(out))
            }
            other if is_plain_value(&other) => Ok(other),
            other => Err(StruxError::mismatch(&other, "is_plain_value")),
        };
        stack.truncate(depth);
        stable
    }

    /// Apply `to_plain` until the value stops changing. Only reductions that
    /// produce a new value count against the bound.
    fn reduce(&self, value: Value, stack: &mut Vec<Instance>) -> StruxResult<Value> {
        let mut current = value;
        let mut steps = 0;
        loop {
            if let Value::Instance(inst) = &current {
                if stack.iter().any(|seen| seen.ptr_eq(inst)) {
                    return Err(StruxError::Circular {
                        value: current.to_string(),
                    });
                }
                stack.push(inst.clone());
            }

            let next = current.to_plain();
            if next.same(&current) {
                return Ok(current);
            }
            if steps == self.max_reduce_steps {
                tracing::debug!(
                    steps,
                    value = %current,
                    "to_plain did not reach a fixed point"
                );
                return Err(StruxError::ReductionLimit {
                    steps,
                    value: current.to_string(),
                });
            }
            steps += 1;
            current = next;
        }
    }
}

/// Generic string ordering of the runtime: UTF-16 code units
fn compare_names(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

/// Canonical key of `value` with default settings
pub fn stabilize_key<T: Normalize + ?Sized>(value: &T) -> StruxResult<String> {
    KeyStabilizer::default().key(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;

    #[test]
    fn test_primitives() {
        assert_eq!(stabilize_key(&Value::Undefined).unwrap(), "");
        assert_eq!(stabilize_key(&Value::Null).unwrap(), "null");
        assert_eq!(stabilize_key(&Value::from("one")).unwrap(), r#""one""#);
        assert_eq!(stabilize_key(&Value::from(10)).unwrap(), "10");
        assert_eq!(stabilize_key(&Value::Number(f64::NAN)).unwrap(), "null");
    }

    #[test]
    fn test_sorting_uses_code_units() {
        // U+FF61 sorts after U+10000 in UTF-16 (surrogates are 0xD800..)
        assert_eq!(compare_names("\u{FF61}", "\u{10000}"), Ordering::Greater);
        assert_eq!(compare_names("a", "b"), Ordering::Less);
        assert_eq!(compare_names("B", "a"), Ordering::Less);
    }

    #[test]
    fn test_hook_reduces_to_fixed_point() {
        // Each Wrapper reduces to its `inner` field, possibly another Wrapper
        let wrapper = Class::builder("Wrapper")
            .to_plain(|this| this.get("inner").unwrap_or_default())
            .build();
        let inner = wrapper.construct(Value::Undefined).unwrap();
        inner.set("inner", Value::record([("b", Value::from(2)), ("a", Value::from(1))]));
        let outer = wrapper.construct(Value::Undefined).unwrap();
        outer.set("inner", Value::Instance(inner));

        assert_eq!(
            stabilize_key(&Value::Instance(outer)).unwrap(),
            r#"{"a":1,"b":2}"#
        );
    }

    #[test]
    fn test_hook_returning_self_is_rejected() {
        let stubborn = Class::builder("Stubborn")
            .to_plain(|this| Value::Instance(this.clone()))
            .build();
        let inst = stubborn.construct(Value::Undefined).unwrap();
        let err = stabilize_key(&inst).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_endless_hook_hits_limit() {
        let growing = Class::builder("Growing")
            .to_plain(|this| {
                let class = this.class().clone();
                Value::Instance(crate::class::Instance::blank(&class))
            })
            .build();
        let inst = growing.construct(Value::Undefined).unwrap();
        let err = KeyStabilizer::new(4).key(&inst).unwrap_err();
        assert!(matches!(err, StruxError::ReductionLimit { steps: 4, .. }));
    }

    #[test]
    fn test_limit_counts_only_changing_reductions() {
        let wrapper = Class::builder("Wrapper")
            .to_plain(|this| this.get("inner").unwrap_or_default())
            .build();
        let inner = wrapper.construct(Value::Undefined).unwrap();
        inner.set("inner", Value::from(1));
        let outer = wrapper.construct(Value::Undefined).unwrap();
        outer.set("inner", Value::Instance(inner.clone()));

        let nested = Value::array(vec![Value::Instance(inner)]);
        assert_eq!(KeyStabilizer::new(1).key(&nested).unwrap(), "[1]");

        let deep = Value::Instance(outer);
        assert_eq!(KeyStabilizer::new(2).key(&deep).unwrap(), "1");
        assert!(matches!(
            KeyStabilizer::new(1).key(&deep).unwrap_err(),
            StruxError::ReductionLimit { steps: 1, .. }
        ));
    }

    #[test]
    fn test_plain_form_containing_itself_is_circular() {
        let node = Class::builder("Node")
            .to_plain(|this| Value::record([("me", Value::Instance(this.clone()))]))
            .build();
        let inst = node.construct(Value::Undefined).unwrap();
        let err = stabilize_key(&Value::Instance(inst)).unwrap_err();
        assert_eq!(
            err,
            StruxError::Circular {
                value: "[object Node]".to_string()
            }
        );
    }

    #[test]
    fn test_shared_instance_is_not_circular() {
        let leaf = Class::builder("Leaf")
            .to_plain(|_| Value::from(1))
            .build();
        let inst = Value::Instance(leaf.construct(Value::Undefined).unwrap());
        let pair = Value::record([("a", inst.clone()), ("b", inst)]);
        assert_eq!(stabilize_key(&pair).unwrap(), r#"{"a":1,"b":1}"#);
    }

    #[test]
    fn test_instance_without_hook_is_not_plain() {
        let class = Class::builder("Mock").build();
        let inst = Value::Instance(class.construct(Value::Undefined).unwrap());
        let err = stabilize_key(&Value::array(vec![inst])).unwrap_err();
        assert!(err.to_string().contains("is_plain_value"));
    }
}
