//! Integration tests for building and compiling filter expressions.
//!
//! These exercise the public API end to end: builders, combinators, the
//! compiler, and the serialized wire message.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use sift::query::{EncodedValue, GeoRange, LeafBuilder, Target, WireOperator, WireTarget};
use sift::{
    FilterError, Operator, Predicate, all_of, any_of, compile, creation_time, id, not, property,
    reference,
};

/// Reference chains nest one single-target wrapper per hop
#[test]
fn test_reference_chain_compiles_to_nested_targets() {
    let filter = reference("r1")
        .reference("r2")
        .property("p")
        .equal("v")
        .expect("text equality is valid");

    assert_eq!(
        compile(&filter).to_json_value().unwrap(),
        json!({
            "operator": "EQUAL",
            "target": {
                "singleTarget": {
                    "on": "r1",
                    "target": {
                        "singleTarget": { "on": "r2", "target": { "property": "p" } }
                    }
                }
            },
            "valueText": "v"
        })
    );
}

/// Handles derived from one reference observe later extensions
#[test]
fn test_reference_handles_alias_the_same_chain() {
    let f1 = reference("r1");
    let f2 = f1.reference("r2").property("p").equal("v").unwrap();

    let count = f1.count().greater_than(0).unwrap();

    assert_eq!(
        compile(&count).target,
        Some(WireTarget::SingleTarget(Box::new(sift::query::wire::SingleTarget {
            on: "r1".into(),
            target: WireTarget::Count(sift::query::wire::ReferenceCount { on: "r2".into() }),
        })))
    );
    // The completed leaf is unaffected by the count built afterwards.
    assert_eq!(f2.as_leaf().unwrap().target().to_string(), "r1.r2.p");
}

/// Length transforms render as a synthetic property
#[test]
fn test_length_target() {
    let wire = compile(&property("name").length().equal(5).unwrap());

    assert_eq!(wire.operator, WireOperator::Equal);
    assert_eq!(wire.target, Some(WireTarget::Property("len(name)".into())));
    assert_eq!(wire.value_int, Some(5));
    assert_eq!(wire.value_fields(), vec!["valueInt"]);
}

/// An empty contains array is accepted and encodes as an empty text array
#[test]
fn test_empty_contains_any() {
    let filter = property("tags").contains_any(Vec::<String>::new()).unwrap();
    let wire = compile(&filter);

    assert_eq!(wire.operator, WireOperator::ContainsAny);
    assert_eq!(
        wire.to_json_value().unwrap(),
        json!({
            "operator": "CONTAINS_ANY",
            "target": { "property": "tags" },
            "valueTextArray": { "values": [] }
        })
    );
}

/// Double negation is kept as two nested nodes
#[test]
fn test_double_negation_is_not_simplified() {
    let leaf = property("banned").equal(true).unwrap();
    let wire = compile(&not(not(leaf)));

    assert_eq!(wire.operator, WireOperator::Not);
    assert_eq!(wire.filters.len(), 1);
    assert_eq!(wire.filters[0].operator, WireOperator::Not);
    assert_eq!(wire.filters[0].filters.len(), 1);
    assert_eq!(wire.filters[0].filters[0].value_boolean, Some(true));
}

/// Negation only accepts exactly one child
#[test]
fn test_negation_arity() {
    let a = property("a").equal(1).unwrap();
    let b = property("b").equal(2).unwrap();

    let err = Predicate::try_negate(Vec::new()).unwrap_err();
    assert_eq!(err.code(), "F1004");

    let err = Predicate::try_negate([a, b]).unwrap_err();
    assert_eq!(err, FilterError::empty_combinator(Operator::Not, 2));
}

/// Value arity and kind mismatches are rejected at construction
#[test]
fn test_value_mismatches() {
    let err = property("age").greater_than(vec![1, 2]).unwrap_err();
    assert!(err.is_operator_not_supported());

    let err = property("tags").contains_all("single").unwrap_err();
    assert!(err.is_operator_not_supported());

    let err = property("tags")
        .contains_none(vec![sift::Value::from(1), sift::Value::from(1.5)])
        .unwrap_err();
    assert!(err.is_type_mismatch());
}

/// Every scalar and array kind lands in exactly one value field
#[test]
fn test_value_fields_round_trip() {
    let date = Utc.with_ymd_and_hms(2024, 2, 29, 12, 30, 0).unwrap();
    let cases: Vec<(Predicate, &str, EncodedValue)> = vec![
        (
            property("a").equal("x").unwrap(),
            "valueText",
            EncodedValue::Text("x".into()),
        ),
        (property("a").equal(7).unwrap(), "valueInt", EncodedValue::Int(7)),
        (
            property("a").equal(2.5).unwrap(),
            "valueNumber",
            EncodedValue::Number(2.5),
        ),
        (
            property("a").is_null(false).unwrap(),
            "valueBoolean",
            EncodedValue::Bool(false),
        ),
        (
            property("a").equal(date).unwrap(),
            "valueText",
            EncodedValue::Text("2024-02-29T12:30:00Z".into()),
        ),
        (
            property("a").contains_any(vec![1, 2]).unwrap(),
            "valueIntArray",
            EncodedValue::IntArray(vec![1, 2]),
        ),
        (
            property("a").contains_all(vec![0.5, 1.5]).unwrap(),
            "valueNumberArray",
            EncodedValue::NumberArray(vec![0.5, 1.5]),
        ),
        (
            property("a").contains_none(vec![true]).unwrap(),
            "valueBooleanArray",
            EncodedValue::BoolArray(vec![true]),
        ),
        (
            property("a").within_geo_range(GeoRange::new(1.0, 2.0, 3.0)).unwrap(),
            "valueGeo",
            EncodedValue::Geo(GeoRange::new(1.0, 2.0, 3.0)),
        ),
    ];

    for (filter, field, expected) in cases {
        let wire = compile(&filter);
        assert_eq!(wire.value_fields(), vec![field]);
        assert_eq!(wire.value(), Some(expected));
    }
}

/// Collection-scoped hops compile to multi-target wrappers
#[test]
fn test_multi_target() {
    let filter = reference("wrote")
        .in_collection("Article")
        .property("title")
        .like("Rust*")
        .unwrap();

    assert_eq!(
        compile(&filter).to_json_value().unwrap(),
        json!({
            "operator": "LIKE",
            "target": {
                "multiTarget": {
                    "on": "wrote",
                    "target": { "property": "title" },
                    "targetCollection": "Article"
                }
            },
            "valueText": "Rust*"
        })
    );
}

/// Metadata targets render their reserved property names
#[test]
fn test_metadata_targets() {
    let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let filter = all_of([
        creation_time().greater_than_or_equal(since).unwrap(),
        id().not_equal(uuid::Uuid::nil()).unwrap(),
    ])
    .unwrap();

    assert_eq!(
        compile(&filter).to_json_value().unwrap(),
        json!({
            "operator": "AND",
            "filters": [
                {
                    "operator": "GREATER_THAN_EQUAL",
                    "target": { "property": "_creationTimeUnix" },
                    "valueText": "2024-01-01T00:00:00Z"
                },
                {
                    "operator": "NOT_EQUAL",
                    "target": { "property": "_id" },
                    "valueText": "00000000-0000-0000-0000-000000000000"
                }
            ]
        })
    );
}

/// Runtime-selected operators go through the same validation
#[test]
fn test_compare_with_parsed_operator() {
    let op: Operator = ">=".parse().unwrap();
    let filter = property("score").compare(op, 10).unwrap();
    assert_eq!(compile(&filter).operator, WireOperator::GreaterThanEqual);

    let op: Operator = "contains_any".parse().unwrap();
    let err = property("title").length().compare(op, vec![1]).unwrap_err();
    assert!(err.is_operator_not_supported());

    assert!("between".parse::<Operator>().is_err());
}

/// Completed predicates can cross threads
#[test]
fn test_predicates_are_send() {
    let filter = any_of([
        property("a").equal(1).unwrap(),
        reference("r").count().less_than(3).unwrap(),
    ])
    .unwrap();

    let expected = compile(&filter);
    let compiled = std::thread::spawn(move || compile(&filter)).join().unwrap();
    assert_eq!(compiled, expected);
}

/// Display renders a readable expression
#[test]
fn test_display() {
    let filter = property("name").equal("x").unwrap() & property("title").length().greater_than(3).unwrap();
    assert_eq!(filter.to_string(), r#"(name = "x" AND len(title) > 3)"#);

    let target: &Target = filter.children()[1].as_leaf().unwrap().target();
    assert_eq!(target, &Target::Length("title".into()));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn arb_leaf() -> impl Strategy<Value = Predicate> {
        prop_oneof![
            ("[a-z]{1,8}", any::<i64>())
                .prop_map(|(name, v)| property(name).equal(v).expect("int equality")),
            ("[a-z]{1,8}", "[a-zA-Z0-9 ]{0,12}")
                .prop_map(|(name, v)| property(name).not_equal(v).expect("text inequality")),
            ("[a-z]{1,8}", 0i64..1000)
                .prop_map(|(rel, n)| reference(rel).count().less_than(n).expect("count ordering")),
            ("[a-z]{1,8}", prop::collection::vec(any::<bool>(), 0..4))
                .prop_map(|(name, v)| property(name).contains_any(v).expect("bool array")),
        ]
    }

    proptest! {
        #[test]
        fn and_operator_matches_all_of(a in arb_leaf(), b in arb_leaf()) {
            let explicit = compile(&all_of([a.clone(), b.clone()]).unwrap());
            prop_assert_eq!(compile(&(a & b)), explicit);
        }

        #[test]
        fn or_operator_matches_any_of(a in arb_leaf(), b in arb_leaf()) {
            let explicit = compile(&any_of([a.clone(), b.clone()]).unwrap());
            prop_assert_eq!(compile(&(a | b)), explicit);
        }

        #[test]
        fn leaves_populate_exactly_one_value_field(leaf in arb_leaf()) {
            let wire = compile(&leaf);
            prop_assert_eq!(wire.value_fields().len(), 1);
            let wire_value = wire.value();
            prop_assert_eq!(wire_value.as_ref(), leaf.as_leaf().map(|l| l.value()));
        }
    }
}
