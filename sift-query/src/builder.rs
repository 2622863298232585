//! Fluent builders for filter predicates.
//!
//! Each builder stage is its own type and only exposes the comparisons that
//! make sense for its target. Applying a comparison validates the operator
//! and value, encodes the value, and returns a finished [`Predicate`].
//!
//! ```rust
//! use sift_query::{any_of, creation_time, id, property, reference};
//! use chrono::{TimeZone, Utc};
//!
//! # fn main() -> sift_query::FilterResult<()> {
//! let recent = creation_time().greater_than(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())?;
//! let long_title = property("title").length().greater_than(20)?;
//! let prolific = reference("wrote").count().greater_than_or_equal(10)?;
//! let tagged = reference("wrote").property("tags").contains_any(["rust", "databases"])?;
//!
//! let filter = recent & any_of([long_title, prolific, tagged])?;
//! assert_eq!(filter.leaf_count(), 4);
//! # Ok(())
//! # }
//! ```
//!
//! Builders that are not statically restricted can still be driven by an
//! operator chosen at runtime through [`LeafBuilder::compare`]; the same
//! validation applies:
//!
//! ```rust
//! use sift_query::{LeafBuilder, Operator, id};
//!
//! let err = id().compare(Operator::GreaterThan, "a1b2c3d4-e5f6-4711-8899-aabbccddeeff").unwrap_err();
//! assert!(err.is_operator_not_supported());
//! ```

use std::rc::Rc;

use smol_str::SmolStr;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{FilterError, FilterResult};
use crate::operator::Operator;
use crate::predicate::{Leaf, Predicate};
use crate::target::{SharedChain, Target, TargetChain, TargetKind, resolve_in};
use crate::value::{EncodedValue, GeoRange, Value, ValueEncoder};

/// A builder stage that can be completed into a leaf predicate.
pub trait LeafBuilder {
    /// Snapshot of the target the completed leaf will carry.
    fn target(&self) -> Target;

    /// Encoder used for comparison values.
    fn encoder(&self) -> ValueEncoder;

    /// Complete the leaf with `operator` and `value`.
    ///
    /// Fails with [`FilterError::OperatorNotSupportedForTarget`] when the
    /// target does not accept the operator or the value shape, and with the
    /// encoder's errors when the value cannot be encoded.
    fn compare(&self, operator: Operator, value: impl Into<Value>) -> FilterResult<Predicate> {
        complete(self.target(), self.encoder(), operator, value.into())
    }
}

fn complete(
    target: Target,
    encoder: ValueEncoder,
    operator: Operator,
    value: Value,
) -> FilterResult<Predicate> {
    let kind = target.kind();
    if !kind.supports(operator) {
        return Err(FilterError::operator_not_supported(
            operator,
            &target,
            unsupported_reason(kind, operator),
        ));
    }

    let value = check_value_kind(kind, value)
        .map_err(|reason| FilterError::operator_not_supported(operator, &target, reason))?;
    let encoded = encoder.encode(value)?;
    check_shape(operator, &encoded)
        .map_err(|reason| FilterError::operator_not_supported(operator, &target, reason))?;

    if encoded.array_len() == Some(0) {
        warn!(path = %target, operator = %operator, "empty array value");
    }
    debug!(path = %target, operator = %operator, value = %encoded, "completed predicate");

    Ok(Predicate::Leaf(Leaf::new(target, operator, encoded)))
}

fn unsupported_reason(kind: TargetKind, operator: Operator) -> String {
    match kind {
        _ if operator.is_combinator() => {
            "combinators take predicates, use all_of, any_of, or not".to_string()
        }
        TargetKind::Length | TargetKind::Count => {
            "only numeric comparisons apply to counts and lengths".to_string()
        }
        TargetKind::Id => "identifiers support equality and contains any/none only".to_string(),
        TargetKind::Timestamp => {
            "timestamps support comparisons and contains any/none only".to_string()
        }
        TargetKind::Property => format!("`{}` is not a property comparison", operator),
    }
}

/// Target-specific value rules. Identifiers accept UUID text, which is
/// normalised to a UUID so it encodes in canonical form.
fn check_value_kind(kind: TargetKind, value: Value) -> Result<Value, String> {
    match kind {
        TargetKind::Property => Ok(value),
        TargetKind::Length | TargetKind::Count => match value {
            Value::Int(_) => Ok(value),
            other => Err(format!("expects an int value, got {}", other.kind())),
        },
        TargetKind::Id => normalize_id(value),
        TargetKind::Timestamp => {
            require_dates(&value)?;
            Ok(value)
        }
    }
}

fn normalize_id(value: Value) -> Result<Value, String> {
    match value {
        Value::Uuid(_) => Ok(value),
        Value::Text(text) => Uuid::parse_str(&text)
            .map(Value::Uuid)
            .map_err(|_| format!("`{}` is not a valid UUID", text)),
        Value::List(items) => items
            .into_iter()
            .map(|item| match item {
                Value::List(_) => Err("expects UUID elements, got list".to_string()),
                item => normalize_id(item),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        other => Err(format!("expects a UUID value, got {}", other.kind())),
    }
}

fn require_dates(value: &Value) -> Result<(), String> {
    match value {
        Value::Date(_) => Ok(()),
        Value::List(items) => items.iter().try_for_each(|item| match item {
            Value::Date(_) => Ok(()),
            other => Err(format!("expects date elements, got {}", other.kind())),
        }),
        other => Err(format!("expects a date value, got {}", other.kind())),
    }
}

fn check_shape(operator: Operator, value: &EncodedValue) -> Result<(), String> {
    let (accepted, expected) = match operator {
        Operator::Like => (matches!(value, EncodedValue::Text(_)), "a text pattern"),
        Operator::IsNull => (matches!(value, EncodedValue::Bool(_)), "a bool"),
        Operator::WithinGeoRange => (matches!(value, EncodedValue::Geo(_)), "a geo range"),
        op if op.is_contains() => (value.is_array(), "an array value"),
        _ => (
            !value.is_array() && !matches!(value, EncodedValue::Geo(_)),
            "a scalar value",
        ),
    };

    if accepted {
        Ok(())
    } else {
        Err(format!("expects {}, got {}", expected, value.arm_name()))
    }
}

macro_rules! comparison_methods {
    () => {
        /// Match values equal to `value`.
        pub fn equal(&self, value: impl Into<Value>) -> FilterResult<Predicate> {
            self.compare(Operator::Equal, value)
        }

        /// Match values not equal to `value`.
        pub fn not_equal(&self, value: impl Into<Value>) -> FilterResult<Predicate> {
            self.compare(Operator::NotEqual, value)
        }

        /// Match values greater than `value`.
        pub fn greater_than(&self, value: impl Into<Value>) -> FilterResult<Predicate> {
            self.compare(Operator::GreaterThan, value)
        }

        /// Match values greater than or equal to `value`.
        pub fn greater_than_or_equal(&self, value: impl Into<Value>) -> FilterResult<Predicate> {
            self.compare(Operator::GreaterThanOrEqual, value)
        }

        /// Match values less than `value`.
        pub fn less_than(&self, value: impl Into<Value>) -> FilterResult<Predicate> {
            self.compare(Operator::LessThan, value)
        }

        /// Match values less than or equal to `value`.
        pub fn less_than_or_equal(&self, value: impl Into<Value>) -> FilterResult<Predicate> {
            self.compare(Operator::LessThanOrEqual, value)
        }
    };
}

/// Entry points for building predicates with a specific [`ValueEncoder`].
///
/// The free functions ([`property`], [`reference`], ...) use the default
/// encoder; a `Filters` built from configuration carries the configured one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Filters {
    encoder: ValueEncoder,
}

impl Filters {
    /// Create a factory that encodes values with `encoder`.
    pub fn new(encoder: ValueEncoder) -> Self {
        Self { encoder }
    }

    /// The encoder handed to every builder.
    pub fn encoder(&self) -> ValueEncoder {
        self.encoder
    }

    /// Start a predicate on a property.
    pub fn property(&self, name: impl Into<SmolStr>) -> PropertyBuilder {
        PropertyBuilder {
            scope: None,
            name: name.into(),
            encoder: self.encoder,
        }
    }

    /// Start a reference chain.
    pub fn reference(&self, relation: impl Into<SmolStr>) -> ReferenceBuilder {
        ReferenceBuilder {
            chain: TargetChain::start(relation),
            encoder: self.encoder,
        }
    }

    /// Start a predicate on the object identifier.
    pub fn id(&self) -> IdBuilder {
        IdBuilder {
            encoder: self.encoder,
        }
    }

    /// Start a predicate on the creation timestamp.
    pub fn creation_time(&self) -> TimestampBuilder {
        TimestampBuilder {
            target: Target::CreationTime,
            encoder: self.encoder,
        }
    }

    /// Start a predicate on the last update timestamp.
    pub fn update_time(&self) -> TimestampBuilder {
        TimestampBuilder {
            target: Target::UpdateTime,
            encoder: self.encoder,
        }
    }
}

/// Start a predicate on a property.
pub fn property(name: impl Into<SmolStr>) -> PropertyBuilder {
    Filters::default().property(name)
}

/// Start a reference chain.
pub fn reference(relation: impl Into<SmolStr>) -> ReferenceBuilder {
    Filters::default().reference(relation)
}

/// Start a predicate on the object identifier.
pub fn id() -> IdBuilder {
    Filters::default().id()
}

/// Start a predicate on the creation timestamp.
pub fn creation_time() -> TimestampBuilder {
    Filters::default().creation_time()
}

/// Start a predicate on the last update timestamp.
pub fn update_time() -> TimestampBuilder {
    Filters::default().update_time()
}

/// A property, either on the filtered collection or at the end of a
/// reference chain.
#[derive(Debug, Clone)]
pub struct PropertyBuilder {
    scope: Option<SharedChain>,
    name: SmolStr,
    encoder: ValueEncoder,
}

impl PropertyBuilder {
    /// The property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compare the length of this text property instead of its value.
    pub fn length(&self) -> LengthBuilder {
        LengthBuilder {
            scope: self.scope.clone(),
            name: self.name.clone(),
            encoder: self.encoder,
        }
    }

    comparison_methods!();

    /// Wildcard match: `?` matches one character, `*` any run of characters.
    pub fn like(&self, pattern: impl Into<String>) -> FilterResult<Predicate> {
        self.compare(Operator::Like, Value::Text(pattern.into()))
    }

    /// Match objects where the property is null (`true`) or set (`false`).
    pub fn is_null(&self, is_null: bool) -> FilterResult<Predicate> {
        self.compare(Operator::IsNull, is_null)
    }

    /// Match array properties sharing at least one element with `values`.
    pub fn contains_any(&self, values: impl Into<Value>) -> FilterResult<Predicate> {
        self.compare(Operator::ContainsAny, values)
    }

    /// Match array properties containing every element of `values`.
    pub fn contains_all(&self, values: impl Into<Value>) -> FilterResult<Predicate> {
        self.compare(Operator::ContainsAll, values)
    }

    /// Match array properties sharing no element with `values`.
    pub fn contains_none(&self, values: impl Into<Value>) -> FilterResult<Predicate> {
        self.compare(Operator::ContainsNone, values)
    }

    /// Match geo coordinates within `range`.
    pub fn within_geo_range(&self, range: GeoRange) -> FilterResult<Predicate> {
        self.compare(Operator::WithinGeoRange, range)
    }
}

impl LeafBuilder for PropertyBuilder {
    fn target(&self) -> Target {
        resolve_in(self.scope.as_ref(), Target::Property(self.name.clone()))
    }

    fn encoder(&self) -> ValueEncoder {
        self.encoder
    }
}

/// The length of a text property. Numeric comparisons only.
#[derive(Debug, Clone)]
pub struct LengthBuilder {
    scope: Option<SharedChain>,
    name: SmolStr,
    encoder: ValueEncoder,
}

impl LengthBuilder {
    comparison_methods!();
}

impl LeafBuilder for LengthBuilder {
    fn target(&self) -> Target {
        resolve_in(self.scope.as_ref(), Target::Length(self.name.clone()))
    }

    fn encoder(&self) -> ValueEncoder {
        self.encoder
    }
}

/// A chain of reference hops.
///
/// Every handle derived from one [`reference`] call shares the same chain:
/// [`reference`](Self::reference) and [`in_collection`](Self::in_collection)
/// mutate it in place, and all handles observe the change. Finished
/// predicates are unaffected because completing a leaf takes a snapshot.
#[derive(Debug, Clone)]
pub struct ReferenceBuilder {
    chain: SharedChain,
    encoder: ValueEncoder,
}

impl ReferenceBuilder {
    /// Follow one more reference hop.
    pub fn reference(&self, relation: impl Into<SmolStr>) -> ReferenceBuilder {
        let relation = relation.into();
        let hop = self.chain.borrow_mut().push(relation.clone());
        debug!(relation = %relation, hop = hop.index(), "extended reference chain");
        Self {
            chain: Rc::clone(&self.chain),
            encoder: self.encoder,
        }
    }

    /// Restrict the current hop to references into `collection`.
    pub fn in_collection(&self, collection: impl Into<SmolStr>) -> ReferenceBuilder {
        let mut chain = self.chain.borrow_mut();
        if let Some(cursor) = chain.cursor() {
            chain.set_collection(cursor, collection);
        }
        drop(chain);
        Self {
            chain: Rc::clone(&self.chain),
            encoder: self.encoder,
        }
    }

    /// End the chain at a property of the referenced objects.
    pub fn property(&self, name: impl Into<SmolStr>) -> PropertyBuilder {
        PropertyBuilder {
            scope: Some(Rc::clone(&self.chain)),
            name: name.into(),
            encoder: self.encoder,
        }
    }

    /// End the chain at the number of objects behind the current hop.
    pub fn count(&self) -> CountBuilder {
        CountBuilder {
            chain: Rc::clone(&self.chain),
            encoder: self.encoder,
        }
    }

    /// Number of hops in the shared chain.
    pub fn depth(&self) -> usize {
        self.chain.borrow().depth()
    }

    /// Check if both handles extend the same chain.
    pub fn shares_chain_with(&self, other: &ReferenceBuilder) -> bool {
        Rc::ptr_eq(&self.chain, &other.chain)
    }
}

/// Number of objects behind a reference. Numeric comparisons only.
#[derive(Debug, Clone)]
pub struct CountBuilder {
    chain: SharedChain,
    encoder: ValueEncoder,
}

impl CountBuilder {
    comparison_methods!();
}

impl LeafBuilder for CountBuilder {
    fn target(&self) -> Target {
        self.chain.borrow().resolve_count()
    }

    fn encoder(&self) -> ValueEncoder {
        self.encoder
    }
}

/// The object identifier. Accepts `Uuid` values or UUID text.
#[derive(Debug, Clone, Copy)]
pub struct IdBuilder {
    encoder: ValueEncoder,
}

impl IdBuilder {
    /// Match the object with identifier `value`.
    pub fn equal(&self, value: impl Into<Value>) -> FilterResult<Predicate> {
        self.compare(Operator::Equal, value)
    }

    /// Match every object except the one with identifier `value`.
    pub fn not_equal(&self, value: impl Into<Value>) -> FilterResult<Predicate> {
        self.compare(Operator::NotEqual, value)
    }

    /// Match objects whose identifier is one of `values`.
    pub fn contains_any(&self, values: impl Into<Value>) -> FilterResult<Predicate> {
        self.compare(Operator::ContainsAny, values)
    }

    /// Match objects whose identifier is none of `values`.
    pub fn contains_none(&self, values: impl Into<Value>) -> FilterResult<Predicate> {
        self.compare(Operator::ContainsNone, values)
    }
}

impl LeafBuilder for IdBuilder {
    fn target(&self) -> Target {
        Target::Id
    }

    fn encoder(&self) -> ValueEncoder {
        self.encoder
    }
}

/// Creation or last update timestamp. Accepts dates only.
#[derive(Debug, Clone)]
pub struct TimestampBuilder {
    target: Target,
    encoder: ValueEncoder,
}

impl TimestampBuilder {
    comparison_methods!();

    /// Match timestamps equal to one of `values`.
    pub fn contains_any(&self, values: impl Into<Value>) -> FilterResult<Predicate> {
        self.compare(Operator::ContainsAny, values)
    }

    /// Match timestamps equal to none of `values`.
    pub fn contains_none(&self, values: impl Into<Value>) -> FilterResult<Predicate> {
        self.compare(Operator::ContainsNone, values)
    }
}

impl LeafBuilder for TimestampBuilder {
    fn target(&self) -> Target {
        self.target.clone()
    }

    fn encoder(&self) -> ValueEncoder {
        self.encoder
    }
}
