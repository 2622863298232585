//! Completed predicate trees.
//!
//! A [`Predicate`] is what builder calls produce once a comparison has been
//! applied. It is an owned, immutable value: cloning it is cheap relative to
//! compilation, and it can be sent to another thread for compilation.
//!
//! Combinators take finished predicates, never builders:
//!
//! ```rust
//! use sift_query::{all_of, not, property};
//!
//! # fn main() -> sift_query::FilterResult<()> {
//! let adult = property("age").greater_than_or_equal(18)?;
//! let active = property("active").equal(true)?;
//!
//! let explicit = all_of([adult.clone(), active.clone()])?;
//! assert_eq!(explicit, adult & active);
//!
//! let banned = not(property("banned").equal(true)?);
//! assert_eq!(banned.to_string(), "NOT (banned = true)");
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use tracing::warn;

use crate::compiler::Compiler;
use crate::error::{FilterError, FilterResult};
use crate::operator::Operator;
use crate::target::Target;
use crate::value::EncodedValue;
use crate::wire::WireFilter;

/// A node of a filter expression: a leaf comparison or a boolean combinator.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// A comparison against a target.
    Leaf(Leaf),
    /// `And`, `Or`, or `Not` over child predicates.
    Combinator(Combinator),
}

/// A leaf predicate: one target, one operator, one encoded value.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    target: Target,
    operator: Operator,
    value: EncodedValue,
}

impl Leaf {
    pub(crate) fn new(target: Target, operator: Operator, value: EncodedValue) -> Self {
        Self {
            target,
            operator,
            value,
        }
    }

    /// The target the comparison applies to.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The comparison operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The encoded comparison value.
    pub fn value(&self) -> &EncodedValue {
        &self.value
    }
}

/// A combinator predicate owning its children in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Combinator {
    operator: Operator,
    children: Vec<Predicate>,
}

impl Combinator {
    /// `And`, `Or`, or `Not`.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Child predicates, in the order they were supplied.
    pub fn children(&self) -> &[Predicate] {
        &self.children
    }
}

impl Predicate {
    /// Combine predicates so that all of them must match.
    ///
    /// Fails with [`FilterError::EmptyCombinator`] when no children are given.
    /// A single child is accepted and kept as a one-element `And`.
    pub fn all_of(children: impl IntoIterator<Item = Predicate>) -> FilterResult<Self> {
        Self::combine(Operator::And, children)
    }

    /// Combine predicates so that at least one of them must match.
    ///
    /// Fails with [`FilterError::EmptyCombinator`] when no children are given.
    pub fn any_of(children: impl IntoIterator<Item = Predicate>) -> FilterResult<Self> {
        Self::combine(Operator::Or, children)
    }

    /// Negate a predicate. Double negation is kept as two nested `Not` nodes.
    pub fn negate(child: Predicate) -> Self {
        Self::Combinator(Combinator {
            operator: Operator::Not,
            children: vec![child],
        })
    }

    /// Negate the only predicate in `children`.
    ///
    /// Fails with [`FilterError::EmptyCombinator`] unless exactly one child is given.
    pub fn try_negate(children: impl IntoIterator<Item = Predicate>) -> FilterResult<Self> {
        let children: Vec<_> = children.into_iter().collect();
        if children.len() != 1 {
            return Err(FilterError::empty_combinator(Operator::Not, children.len()));
        }
        Ok(Self::Combinator(Combinator {
            operator: Operator::Not,
            children,
        }))
    }

    fn combine(
        operator: Operator,
        children: impl IntoIterator<Item = Predicate>,
    ) -> FilterResult<Self> {
        let children: Vec<_> = children.into_iter().collect();
        match children.len() {
            0 => Err(FilterError::empty_combinator(operator, 0)),
            1 => {
                warn!(operator = %operator, "combinator with a single child");
                Ok(Self::Combinator(Combinator { operator, children }))
            }
            _ => Ok(Self::Combinator(Combinator { operator, children })),
        }
    }

    /// The node operator.
    pub fn operator(&self) -> Operator {
        match self {
            Self::Leaf(leaf) => leaf.operator,
            Self::Combinator(node) => node.operator,
        }
    }

    /// Child predicates; empty for leaves.
    pub fn children(&self) -> &[Predicate] {
        match self {
            Self::Leaf(_) => &[],
            Self::Combinator(node) => &node.children,
        }
    }

    /// Check if this is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Get the leaf, if this is one.
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Combinator(_) => None,
        }
    }

    /// Height of the tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(Self::depth).max().unwrap_or(0)
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Combinator(node) => node.children.iter().map(Self::leaf_count).sum(),
        }
    }

    /// Compile with the default compiler.
    pub fn compile(&self) -> WireFilter {
        Compiler::default().compile(self)
    }
}

impl From<Leaf> for Predicate {
    fn from(leaf: Leaf) -> Self {
        Self::Leaf(leaf)
    }
}

/// `a & b` is `all_of([a, b])`.
impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        Self::Combinator(Combinator {
            operator: Operator::And,
            children: vec![self, rhs],
        })
    }
}

/// `a | b` is `any_of([a, b])`.
impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        Self::Combinator(Combinator {
            operator: Operator::Or,
            children: vec![self, rhs],
        })
    }
}

/// `!a` is `not(a)`.
impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        Self::negate(self)
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.target, self.operator.symbol(), self.value)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(leaf) => write!(f, "{}", leaf),
            Self::Combinator(node) if node.operator == Operator::Not => {
                f.write_str("NOT (")?;
                for child in &node.children {
                    write!(f, "{}", child)?;
                }
                f.write_str(")")
            }
            Self::Combinator(node) => {
                f.write_str("(")?;
                for (i, child) in node.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", node.operator.symbol())?;
                    }
                    write!(f, "{}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Require every predicate to match. See [`Predicate::all_of`].
pub fn all_of(children: impl IntoIterator<Item = Predicate>) -> FilterResult<Predicate> {
    Predicate::all_of(children)
}

/// Require at least one predicate to match. See [`Predicate::any_of`].
pub fn any_of(children: impl IntoIterator<Item = Predicate>) -> FilterResult<Predicate> {
    Predicate::any_of(children)
}

/// Negate a predicate. See [`Predicate::negate`].
pub fn not(child: Predicate) -> Predicate {
    Predicate::negate(child)
}
