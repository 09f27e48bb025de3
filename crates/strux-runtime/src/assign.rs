//! Field assignment
//!
//! Copies the enumerable fields of a struct-like source onto a struct-like
//! target. A field whose name only exists on the target as an inherited
//! non-data member (a method, an accessor, `constructor`) is skipped, so data
//! can never shadow behaviour.

use crate::class::{Instance, OBJECT_MEMBERS};
use crate::error::{StruxError, StruxResult};
use crate::policy::Policy;
use crate::predicates::{is_nil, is_struct_like};
use crate::value::{Value, ValueRecord};

/// What to do when the source is undefined or null
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingSource {
    /// Nothing to copy; the target is returned untouched
    #[default]
    Ignore,
    /// Treat a missing source as a type mismatch
    Reject,
}

impl MissingSource {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "ignore" => Some(MissingSource::Ignore),
            "reject" => Some(MissingSource::Reject),
            _ => None,
        }
    }
}

/// Assign `source`'s fields onto `target` under the default policy
pub fn assign_fields<'a>(target: &'a mut Value, source: &Value) -> StruxResult<&'a mut Value> {
    assign_fields_with(&Policy::default(), target, source)
}

/// Assign `source`'s fields onto `target`; `policy.missing_source` decides
/// what an undefined or null source means
pub fn assign_fields_with<'a>(
    policy: &Policy,
    target: &'a mut Value,
    source: &Value,
) -> StruxResult<&'a mut Value> {
    let policy = policy.missing_source;
    match &mut *target {
        Value::Instance(inst) => assign_instance(policy, inst, source)?,
        Value::Record(fields) => assign_record(policy, fields, source)?,
        other => return Err(StruxError::mismatch(other, "is_struct_like")),
    }
    Ok(target)
}

pub(crate) fn assign_instance(
    policy: MissingSource,
    target: &Instance,
    source: &Value,
) -> StruxResult<()> {
    let Some(fields) = source_fields(policy, source, Some(target))? else {
        return Ok(());
    };

    let class = target.class();
    for (name, value) in fields {
        if target.has_own(&name) || !class.has_member(&name) {
            target.set(name, value);
        } else {
            tracing::trace!(class = class.name(), field = %name, "skipping field shadowing a member");
        }
    }
    Ok(())
}

fn assign_record(
    policy: MissingSource,
    target: &mut ValueRecord,
    source: &Value,
) -> StruxResult<()> {
    let Some(fields) = source_fields(policy, source, None)? else {
        return Ok(());
    };

    for (name, value) in fields {
        if target.contains_key(&name) || !OBJECT_MEMBERS.contains(&name.as_str()) {
            target.insert(name, value);
        } else {
            tracing::trace!(field = %name, "skipping field shadowing a member");
        }
    }
    Ok(())
}

/// Validate the source and copy out its fields. `None` means "nothing to do".
///
/// Fields are collected before any write so assigning an instance onto
/// itself never holds a borrow across mutation.
fn source_fields(
    policy: MissingSource,
    source: &Value,
    target: Option<&Instance>,
) -> StruxResult<Option<Vec<(String, Value)>>> {
    if is_nil(source) && policy == MissingSource::Ignore {
        return Ok(None);
    }
    if !is_struct_like(source) {
        return Err(StruxError::mismatch(source, "is_struct_like"));
    }

    match source {
        Value::Record(fields) => Ok(Some(
            fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        )),
        Value::Instance(inst) => match target {
            Some(target) if inst.is_exact(target.class()) => Ok(Some(inst.snapshot())),
            Some(target) => Err(StruxError::mismatch(
                source,
                format!("exact instance of {}", target.class().name()),
            )),
            None => Err(StruxError::mismatch(source, "is_record")),
        },
        _ => Err(StruxError::mismatch(source, "is_struct_like")),
    }
}
