//! Error types for filter construction.
//!
//! Every failure is raised while a predicate is being *built*. Compiling a
//! finished [`Predicate`](crate::Predicate) is a structural transform and
//! never fails.
//!
//! # Error Codes
//!
//! Each error carries a stable code for programmatic handling:
//! - `F1001`: sequence elements of different kinds
//! - `F1002`: a value kind with no wire encoding
//! - `F1003`: operator or value not allowed for the target
//! - `F1004`: combinator with the wrong number of children
//! - `F1005`: operator name that could not be parsed
//!
//! ```rust
//! use sift_query::{FilterError, Value, property};
//!
//! let err = property("tags")
//!     .contains_any(vec![Value::from("a"), Value::from(1)])
//!     .unwrap_err();
//!
//! assert!(err.is_type_mismatch());
//! assert_eq!(err.code(), "F1001");
//! ```

use thiserror::Error;

use crate::operator::Operator;
use crate::value::ValueKind;

/// Result type for filter construction.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors raised while building a filter expression.
///
/// All of these are local programming errors: none are retryable and none
/// are recovered internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// A sequence value mixed element kinds.
    #[error("type mismatch: element {index} is {found}, expected {expected} like the first element")]
    TypeMismatch {
        /// Kind of the first element, which fixes the array kind.
        expected: ValueKind,
        /// Kind of the offending element.
        found: ValueKind,
        /// Position of the offending element.
        index: usize,
    },

    /// A value kind that has no wire encoding.
    #[error("unsupported value type {kind}: {reason}")]
    UnsupportedValueType {
        /// The rejected kind.
        kind: ValueKind,
        /// Why it cannot be encoded.
        reason: String,
    },

    /// An operator or value applied to a target that does not accept it.
    #[error("operator `{operator}` is not supported for target `{target}`: {reason}")]
    OperatorNotSupportedForTarget {
        /// The requested operator.
        operator: Operator,
        /// Human-readable rendering of the target.
        target: String,
        /// Why the combination was rejected.
        reason: String,
    },

    /// A combinator received the wrong number of children.
    #[error("`{operator}` requires {}, got {received}", expected_children(.operator))]
    EmptyCombinator {
        /// The combinator operator.
        operator: Operator,
        /// Number of children supplied.
        received: usize,
    },

    /// An operator name that does not match any operator.
    #[error("unknown operator `{name}`")]
    UnknownOperator {
        /// The name that failed to parse.
        name: String,
    },
}

fn expected_children(operator: &Operator) -> &'static str {
    match operator {
        Operator::Not => "exactly one child",
        _ => "at least one child",
    }
}

impl FilterError {
    /// Create a type mismatch error.
    pub fn type_mismatch(expected: ValueKind, found: ValueKind, index: usize) -> Self {
        Self::TypeMismatch {
            expected,
            found,
            index,
        }
    }

    /// Create an unsupported value type error.
    pub fn unsupported_value(kind: ValueKind, reason: impl Into<String>) -> Self {
        Self::UnsupportedValueType {
            kind,
            reason: reason.into(),
        }
    }

    /// Create an operator/target mismatch error.
    pub fn operator_not_supported(
        operator: Operator,
        target: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::OperatorNotSupportedForTarget {
            operator,
            target: target.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a combinator arity error.
    pub fn empty_combinator(operator: Operator, received: usize) -> Self {
        Self::EmptyCombinator { operator, received }
    }

    /// Create an unknown operator error.
    pub fn unknown_operator(name: impl Into<String>) -> Self {
        Self::UnknownOperator { name: name.into() }
    }

    /// Get the stable error code (e.g., "F1003").
    pub fn code(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "F1001",
            Self::UnsupportedValueType { .. } => "F1002",
            Self::OperatorNotSupportedForTarget { .. } => "F1003",
            Self::EmptyCombinator { .. } => "F1004",
            Self::UnknownOperator { .. } => "F1005",
        }
    }

    /// Get a short description of the error kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "Heterogeneous sequence value",
            Self::UnsupportedValueType { .. } => "Value type has no encoding",
            Self::OperatorNotSupportedForTarget { .. } => "Operator not supported for target",
            Self::EmptyCombinator { .. } => "Invalid combinator arity",
            Self::UnknownOperator { .. } => "Unknown operator name",
        }
    }

    /// Check if this is a type mismatch error.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Check if this is an unsupported value type error.
    pub fn is_unsupported_value(&self) -> bool {
        matches!(self, Self::UnsupportedValueType { .. })
    }

    /// Check if this is an operator/target mismatch error.
    pub fn is_operator_not_supported(&self) -> bool {
        matches!(self, Self::OperatorNotSupportedForTarget { .. })
    }

    /// Check if this is a combinator arity error.
    pub fn is_empty_combinator(&self) -> bool {
        matches!(self, Self::EmptyCombinator { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            FilterError::type_mismatch(ValueKind::Text, ValueKind::Int, 1).code(),
            "F1001"
        );
        assert_eq!(
            FilterError::unsupported_value(ValueKind::Null, "no encoding").code(),
            "F1002"
        );
        assert_eq!(
            FilterError::operator_not_supported(Operator::Like, "_id", "text only").code(),
            "F1003"
        );
        assert_eq!(FilterError::empty_combinator(Operator::And, 0).code(), "F1004");
        assert_eq!(FilterError::unknown_operator("between").code(), "F1005");
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = FilterError::type_mismatch(ValueKind::Text, ValueKind::Int, 2);
        assert_eq!(
            err.to_string(),
            "type mismatch: element 2 is int, expected text like the first element"
        );
    }

    #[test]
    fn test_combinator_message_depends_on_operator() {
        let not = FilterError::empty_combinator(Operator::Not, 2);
        assert_eq!(not.to_string(), "`Not` requires exactly one child, got 2");

        let and = FilterError::empty_combinator(Operator::And, 0);
        assert_eq!(and.to_string(), "`And` requires at least one child, got 0");
    }

    #[test]
    fn test_predicates() {
        let err = FilterError::operator_not_supported(Operator::GreaterThan, "_id", "ordering");
        assert!(err.is_operator_not_supported());
        assert!(!err.is_type_mismatch());
        assert!(!err.is_empty_combinator());
        assert_eq!(err.description(), "Operator not supported for target");
    }
}
