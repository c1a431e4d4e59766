
use anyhow::Result;
use common::*;
use serde_json::json;
use sieve::prelude::*;
use sieveql::ast::{ComparisonOperator, Expr, PathExpr};

#[test]
fn test_page_window_and_totals() -> Result<()> {
    let service = library_service();
    let page = service.page_filter("Book", &filter(json!({"_page": {"limit": 3, "offset": 1}})))?;
    assert_eq!(ids(&page.items), vec![2, 3, 4]);
    assert_eq!((page.current_page, page.total_pages, page.page_size, page.total_rows), (1, 3, 3, 8));
    assert!(page.is_first());
    assert!(page.has_next());
    Ok(())
}

#[test]
fn test_last_page() -> Result<()> {
    let service = library_service();
    let page = service.page_filter("Book", &filter(json!({"_page": {"limit": 3, "offset": 6}})))?;
    assert_eq!(ids(&page.items), vec![7, 8]);
    assert_eq!(page.current_page, 3);
    assert!(page.is_last());
    assert!(page.has_previous());

    let empty = service.page_filter("Book", &filter(json!({"title": "nothing", "_page": {"limit": 3}})))?;
    assert!(empty.items.is_empty());
    assert_eq!((empty.current_page, empty.total_pages, empty.total_rows), (1, 0, 0));
    Ok(())
}

#[test]
fn test_sort_tokens_in_order() -> Result<()> {
    let service = library_service();
    let page = service.page_filter("Book", &filter(json!({"_page": {"sort": ["title", "-published"]}})))?;
    assert_eq!(ids(&page.items), vec![2, 6, 1, 3, 7, 4, 5, 8]);

    // a comma separated string reads the same way, and `+` is ascending
    let page = service.page_filter("Book", &filter(json!({"_page": {"sort": "+title,-published"}})))?;
    assert_eq!(ids(&page.items), vec![2, 6, 1, 3, 7, 4, 5, 8]);
    Ok(())
}

#[test]
fn test_legacy_top_level_sort() -> Result<()> {
    let service = library_service();
    assert_eq!(matching(&service, "Book", json!({"sort": "-pages"}))?, vec![3, 8, 2, 1, 5, 4, 7, 6]);
    assert_eq!(matching(&service, "Author", json!({"_page": {"sort": "-name"}, "books": {}}))?, vec![2, 3, 1, 4]);
    Ok(())
}

#[test]
fn test_filter_returns_every_row_in_sort_order() -> Result<()> {
    let service = library_service();
    let books = service.filter("Book", &filter(json!({"genre": "fantasy", "_page": {"limit": 1, "sort": "published"}})))?;
    assert_eq!(ids(&books), vec![4, 5, 8]);
    Ok(())
}

#[test]
fn test_limit_clamps() -> Result<()> {
    let service = library_service();
    let page = service.page_filter("Book", &filter(json!({"_page": {"limit": 0}})))?;
    assert_eq!(page.page_size, 1);
    assert_eq!(page.total_pages, 8);
    assert_eq!(ids(&page.items), vec![1]);

    let page = service.page_filter("Book", &filter(json!({"_page": {"limit": "100000000000"}})))?;
    assert_eq!(page.page_size, 10_000_000);
    assert_eq!(page.items.len(), 8);

    let page = service.page_filter("Book", &filter(json!({})))?;
    assert_eq!(page.page_size, 10_000);
    Ok(())
}

#[test]
fn test_invalid_sort_tokens() {
    let service = library_service();
    let sort_error = |sort: serde_json::Value| match service.page_filter("Book", &filter(json!({"_page": {"sort": sort}}))) {
        Err(RetrievalError::InvalidFilter(FilterError::InvalidSortToken { reason, .. })) => Some(reason),
        _ => None,
    };
    assert_eq!(sort_error(json!("1title")), Some("not a field name"));
    assert_eq!(sort_error(json!("-")), Some("no field name"));
    assert_eq!(sort_error(json!("title;drop")), Some("not a field name"));
    assert_eq!(sort_error(json!("bogus")), Some("not a sortable field"));
    assert_eq!(sort_error(json!("author")), Some("not a sortable field"));
    assert_eq!(sort_error(json!([1])), Some("not a string"));
}

#[test]
fn test_invalid_page_parameters() {
    let service = library_service();
    let page_error = |page: serde_json::Value| match service.page_filter("Book", &filter(json!({"_page": page}))) {
        Err(RetrievalError::InvalidFilter(FilterError::InvalidPageParameter { name, .. })) => Some(name),
        _ => None,
    };
    assert_eq!(page_error(json!({"offset": -1})), Some("offset"));
    assert_eq!(page_error(json!({"limit": "ten"})), Some("limit"));
    assert_eq!(page_error(json!({"limit": 2.5})), Some("limit"));
    assert_eq!(page_error(json!(5)), Some("page"));
}

#[test]
fn test_explicit_page_spec() -> Result<()> {
    let service = library_service();
    let spec = PageSpec::new(2, 2).sorted_by("-pages")?;
    // the page key of the filter is ignored in favour of the explicit page
    let page = service.page_filter_with("Book", &filter(json!({"_page": {"limit": 50}})), spec)?;
    assert_eq!(ids(&page.items), vec![2, 1]);
    assert_eq!((page.current_page, page.page_size, page.total_pages), (2, 2, 4));
    Ok(())
}

#[test]
fn test_filter_map_paging() -> Result<()> {
    let service = library_service();
    let request = FilterMap::new().eq("author.name", "%tolkien").sorted_by("-published").limit(2).build();
    let page = service.page_filter("Book", &request)?;
    assert_eq!(ids(&page.items), vec![8, 5]);
    assert_eq!(page.total_rows, 3);

    let next = FilterMap::new().eq("author.name", "%tolkien").sorted_by("-published").limit(2).offset(2).build();
    let page = service.page_filter("Book", &next)?;
    assert_eq!(ids(&page.items), vec![4]);
    assert_eq!(page.current_page, 2);
    Ok(())
}

#[test]
fn test_extra_criteria_are_conjoined() -> Result<()> {
    let service = library_service().with_extra_criteria(|schema: &FieldSchema| {
        schema
            .contains("deleted")
            .then(|| Predicate::compare(Expr::Path(PathExpr::simple("deleted")), ComparisonOperator::Equal, Expr::Literal(Literal::Bool(false))))
    });
    let page = service.page_filter("Book", &filter(json!({"author": 2})))?;
    assert_eq!(ids(&page.items), vec![3]);
    assert_eq!(page.total_rows, 1);

    let page = service.page_filter("Book", &filter(json!({})))?;
    assert_eq!(page.total_rows, 7);
    Ok(())
}

#[test]
fn test_page_result_serializes_camel_case() -> Result<()> {
    let service = library_service();
    let page = service.page_filter("Book", &filter(json!({"_page": {"limit": 2, "offset": 2}})))?;
    let titles = page.map(|book| book.get("title").map(ToString::to_string).unwrap_or_default());
    assert_eq!(
        serde_json::to_value(&titles)?,
        json!({"items": ["'Emma'", "'The Hobbit'"], "currentPage": 2, "totalPages": 4, "pageSize": 2, "totalRows": 8})
    );
    Ok(())
}
