//! Compiles predicate trees into wire messages.
//!
//! Compilation is a pure, total, depth-first walk: every tree that the
//! builders can produce compiles, and the compiler keeps no state between
//! calls, so one [`Compiler`] can serve any number of threads.
//!
//! ```rust
//! use sift_query::{compile, reference, WireOperator, WireTarget};
//!
//! # fn main() -> sift_query::FilterResult<()> {
//! let filter = reference("r1").reference("r2").property("p").equal("v")?;
//! let wire = compile(&filter);
//!
//! assert_eq!(wire.operator, WireOperator::Equal);
//! assert_eq!(wire.value_text.as_deref(), Some("v"));
//! assert!(matches!(wire.target, Some(WireTarget::SingleTarget(_))));
//! # Ok(())
//! # }
//! ```

use tracing::{debug, warn};

use crate::predicate::Predicate;
use crate::target::{
    CREATION_TIME_PROPERTY, ID_PROPERTY, Target, UPDATE_TIME_PROPERTY, length_property_name,
};
use crate::wire::{MultiTarget, ReferenceCount, SingleTarget, WireFilter, WireTarget};

/// Predicate tree compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Compiler {
    log_filters: bool,
}

impl Compiler {
    /// Create a compiler with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log every compiled message as JSON at `debug` level.
    pub fn with_filter_logging(mut self, enabled: bool) -> Self {
        self.log_filters = enabled;
        self
    }

    /// Whether compiled messages are logged.
    pub fn logs_filters(&self) -> bool {
        self.log_filters
    }

    /// Compile a predicate tree into one wire message.
    pub fn compile(&self, root: &Predicate) -> WireFilter {
        let wire = compile_node(root, 0);

        debug!(
            operator = ?wire.operator,
            leaves = root.leaf_count(),
            depth = root.depth(),
            "compiled filter"
        );

        if self.log_filters {
            match wire.to_json() {
                Ok(json) => debug!(filter = %json, "compiled filter message"),
                Err(e) => warn!(error = %e, "failed to render compiled filter"),
            }
        }

        wire
    }
}

fn compile_node(node: &Predicate, depth: usize) -> WireFilter {
    crate::sift_trace!(depth, operator = %node.operator(), "compiling node");

    match node {
        Predicate::Leaf(leaf) => {
            let mut wire = WireFilter::new(leaf.operator().into());
            wire.target = Some(compile_target(leaf.target()));
            wire.set_value(leaf.value().clone());
            wire
        }
        Predicate::Combinator(combinator) => {
            let mut wire = WireFilter::new(combinator.operator().into());
            wire.filters = combinator
                .children()
                .iter()
                .map(|child| compile_node(child, depth + 1))
                .collect();
            wire
        }
    }
}

/// Convert a target into its nested wire representation.
pub fn compile_target(target: &Target) -> WireTarget {
    match target {
        Target::Property(name) => WireTarget::Property(name.to_string()),
        Target::Length(name) => WireTarget::Property(length_property_name(name)),
        Target::Id => WireTarget::Property(ID_PROPERTY.to_string()),
        Target::CreationTime => WireTarget::Property(CREATION_TIME_PROPERTY.to_string()),
        Target::UpdateTime => WireTarget::Property(UPDATE_TIME_PROPERTY.to_string()),
        Target::Count(relation) => WireTarget::Count(ReferenceCount {
            on: relation.to_string(),
        }),
        Target::Reference(hop) => {
            let nested = compile_target(&hop.target);
            match &hop.collection {
                Some(collection) => WireTarget::MultiTarget(Box::new(MultiTarget {
                    on: hop.relation.to_string(),
                    target: nested,
                    target_collection: collection.to_string(),
                })),
                None => WireTarget::SingleTarget(Box::new(SingleTarget {
                    on: hop.relation.to_string(),
                    target: nested,
                })),
            }
        }
    }
}

/// Compile a predicate tree with the default compiler.
pub fn compile(root: &Predicate) -> WireFilter {
    Compiler::default().compile(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{id, property, reference};
    use crate::predicate::{all_of, any_of};
    use crate::wire::WireOperator;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_property_leaf() {
        let wire = compile(&property("name").equal("Alice").unwrap());
        assert_eq!(wire.operator, WireOperator::Equal);
        assert_eq!(wire.target, Some(WireTarget::Property("name".into())));
        assert_eq!(wire.value_fields(), vec!["valueText"]);
        assert!(wire.filters.is_empty());
    }

    #[test]
    fn test_length_renders_synthetic_property() {
        let wire = compile(&property("name").length().equal(5).unwrap());
        assert_eq!(wire.target, Some(WireTarget::Property("len(name)".into())));
        assert_eq!(wire.value_int, Some(5));
    }

    #[test]
    fn test_id_renders_reserved_property() {
        let wire = compile(&id().equal(uuid::Uuid::nil()).unwrap());
        assert_eq!(wire.target, Some(WireTarget::Property("_id".into())));
    }

    #[test]
    fn test_count_inside_reference_chain() {
        let filter = reference("r1").reference("r2").count().greater_than(3).unwrap();
        assert_eq!(
            compile(&filter).to_json_value().unwrap(),
            json!({
                "operator": "GREATER_THAN",
                "target": {
                    "singleTarget": { "on": "r1", "target": { "count": { "on": "r2" } } }
                },
                "valueInt": 3
            })
        );
    }

    #[test]
    fn test_combinators_nest_children() {
        let a = property("a").equal(1).unwrap();
        let b = property("b").equal(2).unwrap();
        let wire = compile(&!(a | b));

        assert_eq!(wire.operator, WireOperator::Not);
        assert_eq!(wire.filters.len(), 1);
        assert!(wire.target.is_none());
        assert!(wire.value_fields().is_empty());

        let or = &wire.filters[0];
        assert_eq!(or.operator, WireOperator::Or);
        assert_eq!(or.filters.len(), 2);
        assert_eq!(or.filters[1].value_int, Some(2));
    }

    #[test]
    fn test_single_child_combinators_compile() {
        let leaf = property("a").equal(1).unwrap();

        let and = compile(&all_of([leaf.clone()]).unwrap());
        assert_eq!(and.operator, WireOperator::And);
        assert_eq!(and.filters, vec![compile(&leaf)]);
        assert!(and.value_fields().is_empty());

        let or = compile(&any_of([leaf.clone()]).unwrap());
        assert_eq!(or.operator, WireOperator::Or);
        assert_eq!(or.filters.len(), 1);
        assert_eq!(or.filters[0].value_int, Some(1));
    }

    #[test]
    fn test_compiler_settings() {
        let compiler = Compiler::new().with_filter_logging(true);
        assert!(compiler.logs_filters());

        let filter = property("a").is_null(true).unwrap();
        assert_eq!(compiler.compile(&filter), compile(&filter));
    }
}
