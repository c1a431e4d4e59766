
use common::*;
use serde_json::{json, Value as JsonValue};
use sieve::filter::Operator;
use sieve::prelude::*;
use sieve::value::CastError;

fn parent_error(value: JsonValue) -> FilterError {
    match parent_service().filter("ParentTable", &filter(value)) {
        Err(RetrievalError::InvalidFilter(err)) => err,
        Err(other) => panic!("expected an invalid filter, got {other}"),
        Ok(rows) => panic!("expected an invalid filter, got {} rows", rows.len()),
    }
}

#[test]
fn test_unknown_fields_are_reported_together() {
    let err = parent_error(json!({"bogus": 1, "colString": "abc", "other_thing": 2}));
    assert_eq!(err, FilterError::UnknownFields { entity: "ParentTable".into(), fields: vec!["bogus".into(), "otherThing".into()] });
    assert_eq!(err.to_string(), "unknown fields for ParentTable: bogus, otherThing");

    // negated criteria are checked as well
    let err = parent_error(json!({"NOT": {"nope": 1}}));
    assert!(matches!(err, FilterError::UnknownFields { fields, .. } if fields == vec!["nope".to_string()]));
}

#[test]
fn test_unsupported_operations() {
    let unsupported = |value: JsonValue| match parent_error(value) {
        FilterError::UnsupportedOperation { operator, field, .. } => (operator, field),
        other => panic!("expected an unsupported operation, got {other}"),
    };
    assert_eq!(unsupported(json!({"colBoolean": [true]})), (Operator::In, "colBoolean".to_string()));
    assert_eq!(unsupported(json!({"colBoolean": {"from": false}})), (Operator::GreaterThan, "colBoolean".to_string()));
    assert_eq!(unsupported(json!({"colStatusEnum": {"from": "ACTIVE", "to": "PENDING"}})), (Operator::Between, "colStatusEnum".to_string()));
    assert_eq!(unsupported(json!({"colInteger": "%1"})), (Operator::Like, "colInteger".to_string()));
    assert_eq!(unsupported(json!({"colLocalDate": {"to": "2024-01-01", "flags": "DATE_TIME_SPLIT"}})), (Operator::LessThan, "colLocalDate".to_string()));

    let err = parent_error(json!({"colBoolean": [true]}));
    assert_eq!(err.to_string(), "can't perform a IN operation with a Bool for field colBoolean");
}

#[test]
fn test_unparseable_values() {
    let cast_error = |value: JsonValue| match parent_error(value) {
        FilterError::UnparseableValue(err) => err,
        other => panic!("expected an unparseable value, got {other}"),
    };
    assert!(matches!(cast_error(json!({"colInteger": "ten"})), CastError::InvalidFormat { .. }));
    assert!(matches!(cast_error(json!({"colUuid": "not-a-uuid"})), CastError::InvalidFormat { .. }));
    assert!(matches!(cast_error(json!({"colByte": 300})), CastError::NumericOverflow { .. }));
    assert!(matches!(cast_error(json!({"colLocalDate": "next tuesday"})), CastError::UnidentifiedDate(_)));
    assert!(matches!(cast_error(json!({"colTime": "noon"})), CastError::InvalidFormat { .. }));
    assert!(matches!(cast_error(json!({"colBigInteger": [1, "x"]})), CastError::InvalidFormat { .. }));
    assert!(matches!(cast_error(json!({"colChar": ""})), CastError::Empty(_)));
}

#[test]
fn test_range_errors() {
    assert_eq!(parent_error(json!({"colInteger": {"from": null, "to": null}})), FilterError::EmptyRange { field: "colInteger".into() });
    assert!(matches!(
        parent_error(json!({"colTimestamp": {"from": "2024-01-01", "flags": "SOMETIMES"}})),
        FilterError::UnknownControlFlag { flag } if flag == "SOMETIMES"
    ));
}

#[test]
fn test_unknown_entity() {
    let service = parent_service();
    assert!(matches!(service.filter("Nope", &filter(json!({}))), Err(RetrievalError::UnknownEntity(entity)) if entity == "Nope"));
    assert!(matches!(service.page_filter("Nope", &filter(json!({}))), Err(RetrievalError::UnknownEntity(_))));
}

#[test]
fn test_ignored_input() -> anyhow::Result<()> {
    let service = parent_service();
    // a NOT that is not a map is ignored
    assert_eq!(matching(&service, "ParentTable", json!({"NOT": 5, "colInteger": 10}))?, vec![1]);
    // the page key is reserved at every level
    assert_eq!(matching(&service, "ParentTable", json!({"children": {"_page": {"limit": 1}}}))?, vec![1, 3]);
    Ok(())
}

#[test]
fn test_invalid_configuration() {
    let config = FilterConfig::default().with_time_zone("Mars/Olympus_Mons");
    assert!(matches!(
        FilterService::with_config(parent_catalog(), parent_store(), &config),
        Err(ConfigError::UnknownTimeZone(zone)) if zone == "Mars/Olympus_Mons"
    ));

    let config = FilterConfig { default_limit: 0, ..FilterConfig::default() };
    assert!(matches!(FilterService::with_config(parent_catalog(), parent_store(), &config), Err(ConfigError::InvalidValue { key: "default_limit", .. })));
}
