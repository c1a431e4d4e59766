
use anyhow::Result;
use chrono::NaiveTime;
use common::*;
use serde_json::json;
use sieve::prelude::*;
use sieveql::selection::sql::{generate_count_sql, generate_selection_sql};

#[test]
fn test_selection_with_join_and_page() -> Result<()> {
    let service = library_service();
    let request = filter(json!({"title": "dune", "author": {"name": "%herbert"}, "_page": {"limit": 5, "offset": 10, "sort": "-published"}}));
    let selection = service.selection("Book", &request)?;

    let (sql, args) = generate_selection_sql("Book", &selection)?;
    assert_eq!(
        sql,
        r#"SELECT DISTINCT "Book".* FROM "Book" INNER JOIN "Author" AS "author" ON "Book"."author_id" = "author"."id" WHERE UPPER("Book"."title") = $1 AND UPPER("author"."name") LIKE $2 ORDER BY "Book"."published" DESC LIMIT 5 OFFSET 10"#
    );
    assert_eq!(args, vec![Literal::from("DUNE"), Literal::from("%HERBERT")]);
    Ok(())
}

#[test]
fn test_count_ignores_order_and_window() -> Result<()> {
    let service = library_service();
    let selection = service.selection("Book", &filter(json!({"pages": {"from": 400}, "_page": {"limit": 2, "sort": "title"}})))?;
    let (sql, args) = generate_count_sql("Book", &selection)?;
    assert_eq!(sql, r#"SELECT COUNT(*) FROM (SELECT DISTINCT "Book".* FROM "Book" WHERE "Book"."pages" >= $1) AS "matches""#);
    assert_eq!(args, vec![Literal::I32(400)]);
    Ok(())
}

#[test]
fn test_selection_without_page_key_is_unbounded() -> Result<()> {
    let service = library_service();
    let selection = service.selection("Book", &filter(json!({"NOT": {"title": "emma"}})))?;
    assert_eq!(selection.limit, None);
    assert_eq!(selection.offset, None);
    let (sql, _) = generate_selection_sql("Book", &selection)?;
    assert_eq!(sql, r#"SELECT "Book".* FROM "Book" WHERE NOT (UPPER("Book"."title") = $1)"#);
    Ok(())
}

#[test]
fn test_nested_join_aliases() -> Result<()> {
    let service = parent_service();
    let selection = service.selection("ParentTable", &filter(json!({"children": {"granChild": {"something": "toy"}}})))?;
    let (sql, args) = generate_selection_sql("parent_table", &selection)?;
    assert_eq!(
        sql,
        concat!(
            r#"SELECT DISTINCT "parent_table".* FROM "parent_table""#,
            r#" INNER JOIN "child_table" AS "children" ON "parent_table"."id" = "children"."parent_id""#,
            r#" INNER JOIN "gran_child_table" AS "children.granChild" ON "children"."name" = "children.granChild"."child_table_name""#,
            r#" WHERE UPPER("children.granChild"."something") = $1"#,
        )
    );
    assert_eq!(args, vec![Literal::from("TOY")]);
    Ok(())
}

#[test]
fn test_collection_identity_joins_lazily() -> Result<()> {
    let service = parent_service();
    let selection = service.selection("ParentTable", &filter(json!({"children": ["kid-a", "kid-c"]})))?;
    assert_eq!(selection.joins.len(), 1);
    assert_eq!(selection.joins[0].fetch, FetchMode::Lazy);
    let (sql, args) = generate_selection_sql("parent_table", &selection)?;
    assert!(sql.ends_with(r#"WHERE UPPER("children"."name") IN ($1, $2)"#), "{sql}");
    assert_eq!(args, vec![Literal::from("KID-A"), Literal::from("KID-C")]);
    Ok(())
}

#[test]
fn test_time_of_day_rendering() -> Result<()> {
    let service = parent_service();
    let range = json!({"from": "2024-01-01T09:00:00Z", "to": "2024-04-30T16:00:00Z", "flags": "DATE_TIME_SPLIT"});
    let selection = service.selection("ParentTable", &filter(json!({"colTimestamp": range})))?;
    let (sql, args) = generate_selection_sql("parent_table", &selection)?;
    assert_eq!(
        sql,
        concat!(
            r#"SELECT "parent_table".* FROM "parent_table" WHERE "parent_table"."colTimestamp" BETWEEN $1 AND $2"#,
            r#" AND CAST(("parent_table"."colTimestamp" AT TIME ZONE 'UTC') AS TIME) >= $3"#,
            r#" AND CAST(("parent_table"."colTimestamp" AT TIME ZONE 'UTC') AS TIME) <= $4"#,
        )
    );
    assert_eq!(args[2], Literal::Time(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
    assert_eq!(args[3], Literal::Time(NaiveTime::from_hms_opt(16, 0, 0).unwrap()));
    Ok(())
}
