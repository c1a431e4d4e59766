//! Page and sort requests carried by the reserved page key, and the page descriptor wrapped around results.

use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::naming::to_camel_case;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use sieveql::ast::{OrderByItem, OrderDirection, PathExpr};

const MIN_LIMIT: u64 = 1;
const LIMIT: &str = "limit";
const OFFSET: &str = "offset";
const SORT: &str = "sort";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortToken {
    pub field: String,
    pub direction: OrderDirection,
}

impl SortToken {
    /// `field`, `+field` (ascending) or `-field` (descending). Field names may be snake_case.
    pub fn parse(token: &str) -> Result<Self, FilterError> {
        let trimmed = token.trim();
        let (direction, name) = match trimmed.strip_prefix('-') {
            Some(rest) => (OrderDirection::Desc, rest),
            None => (OrderDirection::Asc, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let field = to_camel_case(name.trim());
        if field.is_empty() {
            return Err(FilterError::InvalidSortToken { token: token.to_string(), reason: "no field name" });
        }
        if field.starts_with(|c: char| c.is_ascii_digit()) || !field.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidSortToken { token: token.to_string(), reason: "not a field name" });
        }
        Ok(Self { field, direction })
    }

    pub fn order_by(&self) -> OrderByItem { OrderByItem { path: PathExpr::simple(self.field.clone()), direction: self.direction } }
}

/// `limit`/`offset`/`sort` of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    pub limit: u64,
    pub offset: u64,
    pub sort: Vec<SortToken>,
}

impl PageSpec {
    pub fn new(limit: u64, offset: u64) -> Self { Self { limit: limit.max(MIN_LIMIT), offset, sort: Vec::new() } }

    pub fn sorted_by(mut self, token: &str) -> Result<Self, FilterError> {
        self.sort.push(SortToken::parse(token)?);
        Ok(self)
    }

    pub fn order_by(&self) -> Vec<OrderByItem> { self.sort.iter().map(SortToken::order_by).collect() }
}

/// Reads page specs out of filter maps
#[derive(Debug, Clone)]
pub struct PaginationBuilder {
    page_key: String,
    sort_key: String,
    default_limit: u64,
    max_limit: u64,
}

impl Default for PaginationBuilder {
    fn default() -> Self { Self::new(&FilterConfig::default()) }
}

impl PaginationBuilder {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            page_key: config.page_key.clone(),
            sort_key: config.sort_key.clone(),
            default_limit: config.default_limit,
            max_limit: config.max_limit,
        }
    }

    pub fn page_key(&self) -> &str { &self.page_key }

    pub fn sort_key(&self) -> &str { &self.sort_key }

    /// Whether the filter carries the page key
    pub fn is_requested(&self, filter: &Map<String, JsonValue>) -> bool { filter.contains_key(&self.page_key) }

    /// Page spec from the page key, or the default page. Without a page key, a top-level sort key still applies.
    pub fn extract(&self, filter: &Map<String, JsonValue>) -> Result<PageSpec, FilterError> {
        match filter.get(&self.page_key) {
            Some(JsonValue::Object(page)) => self.page(page.get(LIMIT), page.get(OFFSET), page.get(SORT)),
            Some(JsonValue::Null) | None => self.page(None, None, filter.get(&self.sort_key)),
            Some(other) => Err(FilterError::InvalidPageParameter { name: "page", reason: format!("expected a map, got {other}") }),
        }
    }

    /// The filter without the page key, and without the legacy top-level sort key when no page key is present
    pub fn strip(&self, filter: &Map<String, JsonValue>) -> Map<String, JsonValue> {
        let legacy_sort = !self.is_requested(filter);
        filter.iter().filter(|(key, _)| **key != self.page_key && !(legacy_sort && **key == self.sort_key)).map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    fn page(&self, limit: Option<&JsonValue>, offset: Option<&JsonValue>, sort: Option<&JsonValue>) -> Result<PageSpec, FilterError> {
        let limit = match limit.filter(|v| !v.is_null()) {
            None => self.default_limit,
            Some(value) => {
                let ceiling = i64::try_from(self.max_limit.max(MIN_LIMIT)).unwrap_or(i64::MAX);
                integer(LIMIT, value)?.max(MIN_LIMIT as i64).min(ceiling) as u64
            }
        };
        let offset = match offset.filter(|v| !v.is_null()) {
            None => 0,
            Some(value) => {
                let offset = integer(OFFSET, value)?;
                u64::try_from(offset).map_err(|_| FilterError::InvalidPageParameter { name: OFFSET, reason: format!("{offset} is negative") })?
            }
        };
        Ok(PageSpec { limit, offset, sort: sort_tokens(sort)? })
    }
}

fn integer(name: &'static str, value: &JsonValue) -> Result<i64, FilterError> {
    let parsed = match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| FilterError::InvalidPageParameter { name, reason: format!("{value} is not an integer") })
}

fn sort_tokens(sort: Option<&JsonValue>) -> Result<Vec<SortToken>, FilterError> {
    match sort {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(JsonValue::String(s)) => s.split(',').map(SortToken::parse).collect(),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|item| match item {
                JsonValue::String(s) => SortToken::parse(s),
                other => Err(FilterError::InvalidSortToken { token: other.to_string(), reason: "not a string" }),
            })
            .collect(),
        Some(other) => Err(FilterError::InvalidSortToken { token: other.to_string(), reason: "expected a string or a list" }),
    }
}

/// One page of results and where it sits among all of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    /// 1-based
    pub current_page: u64,
    pub total_pages: u64,
    pub page_size: u64,
    pub total_rows: u64,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, page: &PageSpec, total_rows: u64) -> Self {
        let page_size = page.limit.max(MIN_LIMIT);
        Self { items, current_page: page.offset / page_size + 1, total_pages: total_rows.div_ceil(page_size), page_size, total_rows }
    }

    pub fn has_next(&self) -> bool { self.current_page < self.total_pages }

    pub fn has_previous(&self) -> bool { self.current_page > 1 }

    pub fn is_first(&self) -> bool { !self.has_previous() }

    pub fn is_last(&self) -> bool { !self.has_next() }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            page_size: self.page_size,
            total_rows: self.total_rows,
        }
    }
}
