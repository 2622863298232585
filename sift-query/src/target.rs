//! Predicate targets and shared reference chains.
//!
//! A [`Target`] is the owned, immutable description of what a finished leaf
//! predicate applies to. While a reference chain is still being *built* it
//! lives in a [`TargetChain`]: an arena of hops addressed by [`HopId`], held
//! behind an `Rc<RefCell<_>>` that every builder handle derived from the same
//! `reference(..)` call shares.
//!
//! # Aliasing
//!
//! Extending a handle appends a hop to the shared arena and advances its
//! cursor, so *all* handles derived from one origin observe the extension:
//!
//! ```rust
//! use sift_query::reference;
//!
//! let author = reference("author");
//! let posts = author.reference("posts");
//!
//! // `author` now points past `posts` as well.
//! assert_eq!(author.depth(), 2);
//! assert_eq!(posts.depth(), 2);
//! ```
//!
//! Completing a leaf snapshots the chain into a [`Target`], so finished
//! predicates never change afterwards. Handles are `!Send`; a single filter
//! expression must be built on one thread.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::operator::Operator;

/// Wire property name of the object identifier.
pub const ID_PROPERTY: &str = "_id";
/// Wire property name of the creation timestamp.
pub const CREATION_TIME_PROPERTY: &str = "_creationTimeUnix";
/// Wire property name of the last update timestamp.
pub const UPDATE_TIME_PROPERTY: &str = "_lastUpdateTimeUnix";

/// Synthetic property name for the length of `property`, e.g. `len(title)`.
pub fn length_property_name(property: &str) -> String {
    format!("len({})", property)
}

/// What a leaf predicate is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// A direct property.
    Property(SmolStr),
    /// The length of a text property.
    Length(SmolStr),
    /// Number of objects linked through a reference.
    Count(SmolStr),
    /// The object identifier.
    Id,
    /// The object creation timestamp.
    CreationTime,
    /// The object last update timestamp.
    UpdateTime,
    /// A hop through a reference to a nested target.
    Reference(Box<ReferenceTarget>),
}

/// A single reference hop with the target it leads to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceTarget {
    /// Name of the reference property.
    pub relation: SmolStr,
    /// Restrict the hop to one target collection.
    pub collection: Option<SmolStr>,
    /// What the hop leads to. Never a bare reference pointer.
    pub target: Target,
}

/// Classification of a target's terminal, which decides the allowed operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Plain property.
    Property,
    /// Length transform of a property.
    Length,
    /// Reference count.
    Count,
    /// Object identifier.
    Id,
    /// Creation or update timestamp.
    Timestamp,
}

impl TargetKind {
    /// Whether a leaf on this kind of target may use `operator`.
    ///
    /// Counts and length transforms are numeric, identifiers only support
    /// (in)equality and set membership, and combinators never apply to leaves.
    pub fn supports(self, operator: Operator) -> bool {
        match self {
            Self::Property => !operator.is_combinator(),
            Self::Length | Self::Count => operator.is_comparison(),
            Self::Id => matches!(
                operator,
                Operator::Equal
                    | Operator::NotEqual
                    | Operator::ContainsAny
                    | Operator::ContainsNone
            ),
            Self::Timestamp => {
                operator.is_comparison()
                    || matches!(operator, Operator::ContainsAny | Operator::ContainsNone)
            }
        }
    }
}

impl Target {
    /// The target a reference chain ends in.
    pub fn terminal(&self) -> &Target {
        let mut current = self;
        while let Target::Reference(hop) = current {
            current = &hop.target;
        }
        current
    }

    /// Kind of the terminal target.
    pub fn kind(&self) -> TargetKind {
        match self {
            Target::Property(_) => TargetKind::Property,
            Target::Length(_) => TargetKind::Length,
            Target::Count(_) => TargetKind::Count,
            Target::Id => TargetKind::Id,
            Target::CreationTime | Target::UpdateTime => TargetKind::Timestamp,
            Target::Reference(hop) => hop.target.kind(),
        }
    }

    /// Number of reference hops before the terminal.
    pub fn hops(&self) -> usize {
        let mut count = 0;
        let mut current = self;
        while let Target::Reference(hop) = current {
            count += 1;
            current = &hop.target;
        }
        count
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(name) => f.write_str(name),
            Self::Length(name) => f.write_str(&length_property_name(name)),
            Self::Count(relation) => write!(f, "count({})", relation),
            Self::Id => f.write_str(ID_PROPERTY),
            Self::CreationTime => f.write_str(CREATION_TIME_PROPERTY),
            Self::UpdateTime => f.write_str(UPDATE_TIME_PROPERTY),
            Self::Reference(hop) => match &hop.collection {
                Some(collection) => write!(f, "{}<{}>.{}", hop.relation, collection, hop.target),
                None => write!(f, "{}.{}", hop.relation, hop.target),
            },
        }
    }
}

/// Index of a hop inside a [`TargetChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HopId(usize);

impl HopId {
    /// Position of the hop in the chain, starting at zero.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Hop {
    relation: SmolStr,
    collection: Option<SmolStr>,
}

/// Arena of reference hops, shared by all builder handles of one chain.
///
/// Hops are only ever appended; the cursor is the most recent hop. A chain
/// always holds at least the hop it was started with.
#[derive(Debug)]
pub struct TargetChain {
    hops: Vec<Hop>,
}

/// Shared handle to a chain under construction.
pub type SharedChain = Rc<RefCell<TargetChain>>;

impl TargetChain {
    /// Start a chain with its first hop.
    pub fn start(relation: impl Into<SmolStr>) -> SharedChain {
        let mut chain = Self { hops: Vec::new() };
        chain.push(relation);
        Rc::new(RefCell::new(chain))
    }

    /// Append a hop after the cursor and move the cursor onto it.
    pub fn push(&mut self, relation: impl Into<SmolStr>) -> HopId {
        self.hops.push(Hop {
            relation: relation.into(),
            collection: None,
        });
        HopId(self.hops.len() - 1)
    }

    /// The hop the next extension attaches to.
    pub fn cursor(&self) -> Option<HopId> {
        self.hops.len().checked_sub(1).map(HopId)
    }

    /// Restrict a hop to a target collection.
    pub fn set_collection(&mut self, hop: HopId, collection: impl Into<SmolStr>) {
        if let Some(entry) = self.hops.get_mut(hop.0) {
            entry.collection = Some(collection.into());
        }
    }

    /// Relation name of a hop.
    pub fn relation(&self, hop: HopId) -> Option<&str> {
        self.hops.get(hop.0).map(|h| h.relation.as_str())
    }

    /// Number of hops.
    pub fn depth(&self) -> usize {
        self.hops.len()
    }

    /// Snapshot the chain with `terminal` attached after the cursor.
    pub fn resolve(&self, terminal: Target) -> Target {
        wrap(&self.hops, terminal)
    }

    /// Snapshot the chain with the cursor hop rendered as a reference count.
    pub fn resolve_count(&self) -> Target {
        match self.hops.split_last() {
            Some((last, outer)) => wrap(outer, Target::Count(last.relation.clone())),
            None => Target::Count(SmolStr::default()),
        }
    }
}

fn wrap(hops: &[Hop], terminal: Target) -> Target {
    hops.iter().rev().fold(terminal, |inner, hop| {
        Target::Reference(Box::new(ReferenceTarget {
            relation: hop.relation.clone(),
            collection: hop.collection.clone(),
            target: inner,
        }))
    })
}

/// Snapshot a terminal inside an optional enclosing chain.
pub(crate) fn resolve_in(scope: Option<&SharedChain>, terminal: Target) -> Target {
    match scope {
        Some(chain) => chain.borrow().resolve(terminal),
        None => terminal,
    }
}
