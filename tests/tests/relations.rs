
use anyhow::Result;
use common::*;
use serde_json::json;

#[test]
fn test_to_many_join() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"children": {"name": "KID-A"}}))?, vec![1]);
    // one parent row, however many children match
    assert_eq!(matching(&service, "ParentTable", json!({"children": {"number": {"from": 1}}}))?, vec![1, 3]);
    assert_eq!(matching(&service, "ParentTable", json!({"children": {"number": {"from": 2}}}))?, vec![1, 3]);
    Ok(())
}

#[test]
fn test_join_alone_requires_a_related_row() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"children": {}}))?, vec![1, 3]);
    // fields the child doesn't declare are dropped, the join stays
    assert_eq!(matching(&service, "ParentTable", json!({"children": {"bogus": 1}}))?, vec![1, 3]);
    assert_eq!(matching(&service, "ParentTable", json!({"children": {"bogus": 1, "number": 3}}))?, vec![3]);
    Ok(())
}

#[test]
fn test_nested_joins() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"children": {"granChild": {"something": "TOY"}}}))?, vec![1]);
    assert_eq!(matching(&service, "ParentTable", json!({"children": {"granChild": {"something": "%o%"}}}))?, vec![1, 3]);
    assert_eq!(matching(&service, "ParentTable", json!({"children": {"number": 2, "granChild": {}}}))?, Vec::<i64>::new());

    let found = service.filter("GranChildTable", &filter(json!({"childTable": {"parent": {"id": 1}}})))?;
    assert_eq!(names(&found), vec!["g1"]);
    Ok(())
}

#[test]
fn test_root_and_join_criteria_combine() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"colBoolean": true, "children": {"number": 3}}))?, vec![3]);
    assert_eq!(matching(&service, "ParentTable", json!({"colBoolean": false, "children": {}}))?, Vec::<i64>::new());
    Ok(())
}

#[test]
fn test_negated_join_applies_per_related_row() -> Result<()> {
    let service = parent_service();
    // parent 1 still has kid-b, which is not number 1
    assert_eq!(matching(&service, "ParentTable", json!({"NOT": {"children": {"number": 1}}}))?, vec![1, 3]);
    Ok(())
}

#[test]
fn test_collection_identity_filters() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"children": "kid-c"}))?, vec![3]);
    assert_eq!(matching(&service, "ParentTable", json!({"children": ["kid-b", "KID-C", "nobody"]}))?, vec![1, 3]);
    Ok(())
}

#[test]
fn test_to_one_relation() -> Result<()> {
    let service = parent_service();
    assert_eq!(matching(&service, "ParentTable", json!({"someTable": 200}))?, vec![3, 4]);
    assert_eq!(matching(&service, "ParentTable", json!({"someTable": null}))?, vec![5, 6, 7, 8]);
    assert_eq!(matching(&service, "ParentTable", json!({"someTable": {"name": "first"}}))?, vec![1, 2]);
    assert_eq!(matching(&service, "ParentTable", json!({"someTable": {"value": {"from": 1}}}))?, vec![1, 2, 3, 4]);

    let children = service.filter("ChildTable", &filter(json!({"parent": {"colString": "abc"}})))?;
    assert_eq!(names(&children), vec!["kid-a", "kid-b"]);
    let children = service.filter("ChildTable", &filter(json!({"parent": 3})))?;
    assert_eq!(names(&children), vec!["kid-c"]);
    Ok(())
}

#[test]
fn test_library_joins() -> Result<()> {
    let service = library_service();
    assert_eq!(matching(&service, "Author", json!({"books": {"title": "dune"}}))?, vec![1, 4]);
    assert_eq!(matching(&service, "Author", json!({"books": {"genre": "fantasy", "pages": {"from": 400}}}))?, vec![3]);
    assert_eq!(matching(&service, "Author", json!({"books": {}}))?, vec![1, 2, 3, 4]);
    assert_eq!(matching(&service, "Author", json!({"books": [3, 7]}))?, vec![2]);
    assert_eq!(matching(&service, "Book", json!({"author": {"name": "%herbert"}}))?, vec![1, 2, 6]);
    Ok(())
}

#[test]
fn test_inherited_fields() -> Result<()> {
    let service = library_service();
    assert_eq!(matching(&service, "Book", json!({"deleted": true}))?, vec![7]);
    // the author's identity comes from the base entity
    assert_eq!(matching(&service, "Book", json!({"author": 3}))?, vec![4, 5, 8]);
    assert_eq!(matching(&service, "Book", json!({"author": {"id": [1, 2], "deleted": false}, "published": {"from": "1900-01-01"}}))?, vec![1, 2]);
    Ok(())
}
