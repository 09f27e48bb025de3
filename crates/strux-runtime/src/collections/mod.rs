//! Class-coercing collections
//!
//! Thin wrappers over standard containers whose inserting operations pipe
//! every value through [`to_instance`](crate::coerce::to_instance) before it
//! is stored. Keys of maps and dictionaries are never coerced.

pub mod arr;
pub mod cls_arr;
pub mod cls_dict;
pub mod cls_map;
pub mod cls_set;
pub mod dict;

pub use arr::Arr;
pub use cls_arr::ClsArr;
pub use cls_dict::ClsDict;
pub use cls_map::ClsMap;
pub use cls_set::ClsSet;
pub use dict::Dict;

use crate::class::{ClassRef, Instance};
use crate::coerce::to_instance;
use crate::error::StruxResult;
use crate::value::Value;

/// Commit strategy for operations inserting several values at once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchMode {
    /// Coerce every value first and only then store them; a failure
    /// leaves the collection untouched
    #[default]
    Atomic,
    /// Coerce and store one value at a time; values before a failure stay
    Sequential,
}

impl BatchMode {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "atomic" => Some(BatchMode::Atomic),
            "sequential" => Some(BatchMode::Sequential),
            _ => None,
        }
    }
}

/// Coerce `values` in call order and hand each instance to `commit`
/// according to `mode`.
pub(crate) fn insert_batch<I, F>(
    mode: BatchMode,
    class: &ClassRef,
    values: I,
    mut commit: F,
) -> StruxResult<()>
where
    I: IntoIterator<Item = Value>,
    F: FnMut(Instance),
{
    match mode {
        BatchMode::Atomic => {
            let coerced = values
                .into_iter()
                .map(|value| to_instance(value, class))
                .collect::<StruxResult<Vec<_>>>()?;
            coerced.into_iter().for_each(commit);
        }
        BatchMode::Sequential => {
            for value in values {
                commit(to_instance(value, class)?);
            }
        }
    }
    Ok(())
}
