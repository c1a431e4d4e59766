
use anyhow::Result;
use common::*;
use serde_json::json;

#[test]
fn test_bounds_are_inclusive() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colInteger": {"from": 30, "to": 50}}))?, vec![3, 4, 5]);
    assert_eq!(matching(&service, "ParentTable", json!({"colInteger": {"from": 80}}))?, vec![8]);
    assert_eq!(matching(&service, "ParentTable", json!({"colInteger": {"to": 10}}))?, vec![1]);
    // an explicit null bound is the same as a missing one
    assert_eq!(matching(&service, "ParentTable", json!({"colInteger": {"from": 70, "to": null}}))?, vec![7, 8]);
    Ok(())
}

#[test]
fn test_inverted_range_matches_nothing() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colInteger": {"from": 50, "to": 10}}))?, Vec::<i64>::new());
    Ok(())
}

#[test]
fn test_date_range() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colLocalDate": {"from": "2024-02-01", "to": "2024-03-01"}}))?, vec![3, 4, 5]);
    // a zoned input keeps its own calendar date
    assert_eq!(matching(&service, "ParentTable", json!({"colLocalDate": "2024-02-01T10:00:00Z"}))?, vec![3]);
    Ok(())
}

#[test]
fn test_equivalent_instant_formats() -> Result<()> {
    let service = parent_service();
    let inputs = [
        json!("2024-02-01"),
        json!("2024-02-01T00:00:00"),
        json!("2024-02-01T00:00:00Z"),
        json!("2024-02-01T01:00:00+01:00"),
        json!("2024-02-01T01:00:00+01:00[Europe/Paris]"),
        json!(1_706_745_600),
        json!("1706745600000"),
        json!("2024-02-01 00:00:00.0"),
        json!("Thu, 01 Feb 2024 00:00:00 GMT"),
    ];
    for input in inputs {
        let found = matching(&service, "ParentTable", json!({"colTimestamp": {"from": input}}))?;
        assert_eq!(found, vec![3, 4, 5, 6, 7, 8], "from {input}");
    }
    Ok(())
}

#[test]
fn test_local_date_time_range() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colLocalDateTime": {"to": "2024-01-15T12:00:00"}}))?, vec![2]);
    assert_eq!(matching(&service, "ParentTable", json!({"colTime": {"from": "12:00:00", "to": "16:00:00"}}))?, vec![1, 5, 7]);
    Ok(())
}

#[test]
fn test_time_of_day_flag_bounds_the_clock() -> Result<()> {
    let service = parent_service();
    let range = json!({"from": "2024-01-01T09:00:00Z", "to": "2024-04-30T16:00:00Z"});
    assert_eq!(matching(&service, "ParentTable", json!({"colTimestamp": range}))?, vec![1, 2, 3, 4, 5, 6, 7, 8]);

    let split = json!({"from": "2024-01-01T09:00:00Z", "to": "2024-04-30T16:00:00Z", "flags": "DATE_TIME_SPLIT"});
    assert_eq!(matching(&service, "ParentTable", json!({"colTimestamp": split}))?, vec![1, 2, 5, 7]);

    let open = json!({"from": "2024-01-01T16:00:00Z", "flags": ["time_of_day"]});
    assert_eq!(matching(&service, "ParentTable", json!({"colTimestamp": open}))?, vec![3, 6, 8]);
    Ok(())
}

#[test]
fn test_numeric_ranges() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colBigDecimal": {"from": "200", "to": "420.0"}}))?, vec![2, 3, 4]);
    assert_eq!(matching(&service, "ParentTable", json!({"colFloat": {"from": 10}}))?, vec![4, 5, 6, 7, 8]);
    // no row has a colBigInteger
    assert_eq!(matching(&service, "ParentTable", json!({"colBigInteger": {"from": "1"}}))?, Vec::<i64>::new());
    Ok(())
}

#[test]
fn test_out_of_range_int_clamps() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colInteger": {"to": 99_999_999_999i64}}))?, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(matching(&service, "ParentTable", json!({"colInteger": 99_999_999_999i64}))?, Vec::<i64>::new());
    Ok(())
}
