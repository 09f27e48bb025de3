//! Runtime error type
//!
//! Every variant carries the printable form of the offending value so a failure
//! can be diagnosed from the message alone.

use crate::value::Value;
use thiserror::Error;

/// Errors raised by coercion, assignment, key stabilization and the collections
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StruxError {
    /// A constructor accepting 0 or 1 arguments received more
    #[error("expected between {min} and {max} args, got {got}")]
    ArgumentCount { min: usize, max: usize, got: usize },

    /// A value failed a required-shape predicate
    #[error("type mismatch: expected {value} to satisfy test {test}")]
    TypeMismatch { value: String, test: String },

    /// A structural dictionary key collides with an inherited member
    #[error("can't set {key} due to conflict with {existing}")]
    KeyConflict { key: String, existing: String },

    /// A stored property name is not a decodable canonical key
    #[error("invalid canonical key {key}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// Text could not be decoded as JSON
    #[error("can't decode {input}: {reason}")]
    Decode { input: String, reason: String },

    /// The `to_plain` hook kept producing new values
    #[error("value did not settle after {steps} reductions: {value}")]
    ReductionLimit { steps: usize, value: String },

    /// Encoding reached an instance that contains itself
    #[error("circular reference detected while encoding {value}")]
    Circular { value: String },
}

impl StruxError {
    /// Build a type mismatch for `value` failing the named test
    pub fn mismatch(value: &Value, test: impl Into<String>) -> Self {
        StruxError::TypeMismatch {
            value: value.to_string(),
            test: test.into(),
        }
    }

    /// Check that a constructor received between `min` and `max` arguments
    pub fn check_arg_count(got: usize, min: usize, max: usize) -> StruxResult<()> {
        if got < min || got > max {
            return Err(StruxError::ArgumentCount { min, max, got });
        }
        Ok(())
    }

    /// True for the shape-predicate failures
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, StruxError::TypeMismatch { .. })
    }
}

/// Result alias used throughout the runtime
pub type StruxResult<T> = Result<T, StruxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message() {
        let err = StruxError::mismatch(&Value::Number(10.0), "is_struct_like");
        assert_eq!(
            err.to_string(),
            "type mismatch: expected 10 to satisfy test is_struct_like"
        );
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_arg_count() {
        assert!(StruxError::check_arg_count(0, 0, 1).is_ok());
        assert!(StruxError::check_arg_count(1, 0, 1).is_ok());
        let err = StruxError::check_arg_count(2, 0, 1).unwrap_err();
        assert_eq!(err.to_string(), "expected between 0 and 1 args, got 2");
    }

    #[test]
    fn test_conflict_message() {
        let err = StruxError::KeyConflict {
            key: "null".to_string(),
            existing: "null".to_string(),
        };
        assert!(err.to_string().contains("conflict"));
        assert!(!err.is_type_mismatch());
    }
}
