//! The closed set of filter operators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Filter operator, shared by leaf comparisons and boolean combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Equal to the value.
    Equal,
    /// Not equal to the value.
    NotEqual,
    /// Strictly greater than the value.
    GreaterThan,
    /// Greater than or equal to the value.
    GreaterThanOrEqual,
    /// Strictly less than the value.
    LessThan,
    /// Less than or equal to the value.
    LessThanOrEqual,
    /// Array property shares at least one element with the value.
    ContainsAny,
    /// Array property contains every element of the value.
    ContainsAll,
    /// Array property shares no element with the value.
    ContainsNone,
    /// Every child matches.
    And,
    /// At least one child matches.
    Or,
    /// The single child does not match.
    Not,
    /// Wildcard text match (`?` and `*`).
    Like,
    /// Property is (or is not) null.
    IsNull,
    /// Geo coordinate lies within a distance of a point.
    WithinGeoRange,
}

impl Operator {
    /// All operators, in declaration order.
    pub const ALL: [Operator; 15] = [
        Self::Equal,
        Self::NotEqual,
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
        Self::LessThan,
        Self::LessThanOrEqual,
        Self::ContainsAny,
        Self::ContainsAll,
        Self::ContainsNone,
        Self::And,
        Self::Or,
        Self::Not,
        Self::Like,
        Self::IsNull,
        Self::WithinGeoRange,
    ];

    /// Boolean combinators carry children instead of a value.
    pub const fn is_combinator(self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Not)
    }

    /// Ordering comparisons (`>`, `>=`, `<`, `<=`).
    pub const fn is_ordering(self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::GreaterThanOrEqual | Self::LessThan | Self::LessThanOrEqual
        )
    }

    /// Equality, inequality, and ordering comparisons.
    pub const fn is_comparison(self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual) || self.is_ordering()
    }

    /// Set operators that take an array value.
    pub const fn is_contains(self) -> bool {
        matches!(self, Self::ContainsAny | Self::ContainsAll | Self::ContainsNone)
    }

    /// Canonical name, as used in error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "Equal",
            Self::NotEqual => "NotEqual",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqual => "GreaterThanOrEqual",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqual => "LessThanOrEqual",
            Self::ContainsAny => "ContainsAny",
            Self::ContainsAll => "ContainsAll",
            Self::ContainsNone => "ContainsNone",
            Self::And => "And",
            Self::Or => "Or",
            Self::Not => "Not",
            Self::Like => "Like",
            Self::IsNull => "IsNull",
            Self::WithinGeoRange => "WithinGeoRange",
        }
    }

    /// Infix symbol used when rendering an expression.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::ContainsAny => "CONTAINS ANY",
            Self::ContainsAll => "CONTAINS ALL",
            Self::ContainsNone => "CONTAINS NONE",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Like => "LIKE",
            Self::IsNull => "IS NULL",
            Self::WithinGeoRange => "WITHIN",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    /// Parse a canonical name (case-insensitive), a snake_case name, or a symbol.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let op = match trimmed {
            "=" | "==" => Self::Equal,
            "!=" | "<>" => Self::NotEqual,
            ">" => Self::GreaterThan,
            ">=" => Self::GreaterThanOrEqual,
            "<" => Self::LessThan,
            "<=" => Self::LessThanOrEqual,
            "&" | "&&" => Self::And,
            "|" | "||" => Self::Or,
            "!" => Self::Not,
            _ => {
                let normalized = trimmed.replace('_', "").to_ascii_lowercase();
                Self::ALL
                    .into_iter()
                    .find(|op| op.as_str().eq_ignore_ascii_case(&normalized))
                    .ok_or_else(|| FilterError::unknown_operator(s))?
            }
        };
        Ok(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(Operator::And.is_combinator());
        assert!(Operator::Not.is_combinator());
        assert!(!Operator::Equal.is_combinator());

        assert!(Operator::LessThanOrEqual.is_ordering());
        assert!(!Operator::Equal.is_ordering());
        assert!(Operator::Equal.is_comparison());

        assert!(Operator::ContainsNone.is_contains());
        assert!(!Operator::Like.is_contains());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Equal".parse::<Operator>().unwrap(), Operator::Equal);
        assert_eq!("greater_than".parse::<Operator>().unwrap(), Operator::GreaterThan);
        assert_eq!("CONTAINS_ANY".parse::<Operator>().unwrap(), Operator::ContainsAny);
        assert_eq!("isnull".parse::<Operator>().unwrap(), Operator::IsNull);
    }

    #[test]
    fn test_parse_symbols() {
        assert_eq!(">=".parse::<Operator>().unwrap(), Operator::GreaterThanOrEqual);
        assert_eq!("!=".parse::<Operator>().unwrap(), Operator::NotEqual);
        assert_eq!("||".parse::<Operator>().unwrap(), Operator::Or);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "between".parse::<Operator>().unwrap_err();
        assert!(matches!(err, FilterError::UnknownOperator { ref name } if name == "between"));
    }

    #[test]
    fn test_display_matches_name() {
        for op in Operator::ALL {
            assert_eq!(op.to_string(), op.as_str());
        }
    }
}
