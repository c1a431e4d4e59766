
use anyhow::Result;
use common::*;
use serde_json::json;
use sieve::prelude::*;

#[test]
fn test_text_equality_ignores_case() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colString": "abc"}))?, vec![1, 2]);
    assert_eq!(matching(&service, "ParentTable", json!({"colString": "hello WORLD"}))?, vec![4]);
    assert_eq!(matching(&service, "ParentTable", json!({"colString": "ünïcode"}))?, vec![7]);
    assert_eq!(matching(&service, "ParentTable", json!({"colChar": "A"}))?, vec![1]);
    Ok(())
}

#[test]
fn test_negation_partitions_non_null_rows() -> Result<()> {
    let service = parent_service();
    let equal = matching(&service, "ParentTable", json!({"colString": "abc"}))?;
    let not_equal = matching(&service, "ParentTable", json!({"NOT": {"colString": "abc"}}))?;
    assert_eq!(not_equal, vec![3, 4, 5, 7, 8]);

    // row 6 has no colString, so it is in neither side
    let mut union: Vec<i64> = equal.into_iter().chain(not_equal).collect();
    union.sort();
    assert_eq!(union, vec![1, 2, 3, 4, 5, 7, 8]);

    // the NOT key is case-insensitive
    assert_eq!(matching(&service, "ParentTable", json!({"not": {"colString": "abc"}}))?, vec![3, 4, 5, 7, 8]);
    Ok(())
}

#[test]
fn test_list_matches_any_member() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colInteger": [10, 30, 999]}))?, vec![1, 3]);
    assert_eq!(matching(&service, "ParentTable", json!({"colString": ["abc", "XYZ"]}))?, vec![1, 2, 3]);
    assert_eq!(matching(&service, "ParentTable", json!({"colInteger": [[20], [40, 60]]}))?, vec![2, 4, 6]);
    Ok(())
}

#[test]
fn test_keyed_bag_matches_any_value() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colInteger": {"first": 20, "second": 40}}))?, vec![2, 4]);
    Ok(())
}

#[test]
fn test_like_patterns() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colString": "%hello%"}))?, vec![4, 5]);
    assert_eq!(matching(&service, "ParentTable", json!({"colString": "hello%"}))?, vec![4, 5]);
    assert_eq!(matching(&service, "ParentTable", json!({"colString": "%c"}))?, vec![1, 2]);
    assert_eq!(matching(&service, "ParentTable", json!({"colString": "%ode"}))?, vec![7]);
    assert_eq!(matching(&service, "ParentTable", json!({"colString": "%nothing%"}))?, Vec::<i64>::new());
    Ok(())
}

#[test]
fn test_null_tests() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colString": null}))?, vec![6]);
    assert_eq!(matching(&service, "ParentTable", json!({"NOT": {"colString": null}}))?, vec![1, 2, 3, 4, 5, 7, 8]);
    // a field missing from a record reads as null
    assert_eq!(matching(&service, "ParentTable", json!({"colShape": null}))?, vec![2, 3, 4, 5, 6, 7, 8]);
    Ok(())
}

#[test]
fn test_enum_members_ignore_case() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colStatusEnum": "active"}))?, vec![1, 3, 5, 7]);
    assert_eq!(matching(&service, "ParentTable", json!({"colStatusEnum": ["Pending", "INACTIVE"]}))?, vec![2, 4, 6, 8]);
    // not a member: compares against null and matches nothing
    assert_eq!(matching(&service, "ParentTable", json!({"colStatusEnum": "retired"}))?, Vec::<i64>::new());
    Ok(())
}

#[test]
fn test_booleans_are_lenient() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colBoolean": true}))?, vec![1, 3, 5, 7]);
    assert_eq!(matching(&service, "ParentTable", json!({"colBoolean": "TRUE"}))?, vec![1, 3, 5, 7]);
    assert_eq!(matching(&service, "ParentTable", json!({"colBoolean": "yes"}))?, vec![2, 4, 6, 8]);
    Ok(())
}

#[test]
fn test_numeric_widths() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colLong": 3_000_000_000_000i64}))?, vec![3]);
    assert_eq!(matching(&service, "ParentTable", json!({"colShort": "40"}))?, vec![4]);
    assert_eq!(matching(&service, "ParentTable", json!({"colByte": 5}))?, vec![5]);
    assert_eq!(matching(&service, "ParentTable", json!({"colDouble": 7.5}))?, vec![3]);
    assert_eq!(matching(&service, "ParentTable", json!({"colFloat": "12.5"}))?, vec![5]);
    assert_eq!(matching(&service, "ParentTable", json!({"colBigDecimal": "315.0"}))?, vec![3]);
    assert_eq!(matching(&service, "ParentTable", json!({"colBigDecimal": 315}))?, vec![3]);
    Ok(())
}

#[test]
fn test_uuid_and_pass_through_types() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colUuid": "67e55044-10b1-426f-9247-bb680e5fe0c8"}))?, vec![1]);
    // no caster for Shape: the text is compared as given
    assert_eq!(matching(&service, "ParentTable", json!({"colShape": "circle"}))?, vec![1]);
    Ok(())
}

#[test]
fn test_snake_case_keys_are_camelized() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"col_integer": 10}))?, vec![1]);
    assert_eq!(matching(&service, "ParentTable", json!({"col_string_": "xyz"}))?, vec![3]);
    assert_eq!(matching(&service, "ParentTable", json!({"COL_STATUS_ENUM": "pending"}))?, vec![4, 8]);
    Ok(())
}

#[test]
fn test_criteria_are_conjoined() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colBoolean": true, "colInteger": {"from": 30}}))?, vec![3, 5, 7]);
    assert_eq!(matching(&service, "ParentTable", json!({"colBoolean": true, "NOT": {"colStatusEnum": "active"}}))?, Vec::<i64>::new());
    Ok(())
}

#[test]
fn test_empty_filter_matches_everything() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({}))?, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    Ok(())
}

#[test]
fn test_filter_map_builder() -> Result<()> {
    let service = parent_service();
    let filter = FilterMap::new().eq("colStatusEnum", "ACTIVE").not_eq("colInteger", 10).build();
    assert_eq!(ids(&service.filter("ParentTable", &filter)?), vec![3, 5, 7]);

    let filter = FilterMap::new().eq_any("colInteger", [20, 30]).is_null("colShape").build();
    assert_eq!(ids(&service.filter("ParentTable", &filter)?), vec![2, 3]);
    Ok(())
}
