//! Strux Runtime - class-coercing and structural-key collections
//!
//! This library provides collections for a dynamic object runtime:
//! - A structural-key dictionary keyed by canonical value encodings
//! - Sequence, set, map and dictionary wrappers that coerce into a declared class
//! - Field assignment with shadow protection for lightweight value objects
//! - A deferred callback queue with pause/flush semantics

/// Strux runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod assign;
pub mod class;
pub mod coerce;
pub mod collections;
pub mod eq_dict;
pub mod error;
pub mod json;
pub mod keys;
pub mod policy;
pub mod predicates;
pub mod queue;
pub mod value;

// Re-export commonly used types
pub use assign::{assign_fields, assign_fields_with, MissingSource};
pub use class::{Class, ClassBuilder, ClassRef, Instance};
pub use coerce::{to_instance, to_instance_lenient, to_instance_opt};
pub use collections::{Arr, BatchMode, ClsArr, ClsDict, ClsMap, ClsSet, Dict};
pub use eq_dict::EqDict;
pub use error::{StruxError, StruxResult};
pub use keys::{stabilize_key, KeyStabilizer, Normalize};
pub use policy::Policy;
pub use queue::Que;
pub use value::{Callable, Value, ValueArray, ValueRecord};
