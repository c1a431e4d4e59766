use crate::config::DEFAULT_PAGE_KEY;
use serde_json::{Map, Value as JsonValue};

/// Fluent construction of filter maps.
///
/// ```
/// use sieve_core::filter::FilterMap;
/// use serde_json::json;
///
/// let filter = FilterMap::new().eq("author.name", "Tolkien").greater_than("published", "1950-01-01").limit(20).build();
/// assert_eq!(filter["author"], json!({"name": "Tolkien"}));
/// assert_eq!(filter["_page"], json!({"limit": 20}));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterMap {
    filter: Map<String, JsonValue>,
    page: Map<String, JsonValue>,
    sort: Vec<String>,
}

impl FilterMap {
    pub fn new() -> Self { Self::default() }

    /// `field` equal to `value`. A dotted field nests into relation filters.
    pub fn eq(mut self, field: &str, value: impl Into<JsonValue>) -> Self {
        insert_path(&mut self.filter, field, value.into());
        self
    }

    pub fn eq_any<V: Into<JsonValue>>(self, field: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<JsonValue> = values.into_iter().map(Into::into).collect();
        self.eq(field, values)
    }

    pub fn is_null(self, field: &str) -> Self { self.eq(field, JsonValue::Null) }

    /// Negated equality, collected under the `NOT` key
    pub fn not_eq(mut self, field: &str, value: impl Into<JsonValue>) -> Self {
        let negated = self.filter.entry("NOT").or_insert_with(|| JsonValue::Object(Map::new()));
        if !negated.is_object() {
            *negated = JsonValue::Object(Map::new());
        }
        if let JsonValue::Object(negated) = negated {
            insert_path(negated, field, value.into());
        }
        self
    }

    /// Inclusive lower bound
    pub fn greater_than(self, field: &str, from: impl Into<JsonValue>) -> Self { self.range(field, Some(from.into()), None) }

    /// Inclusive upper bound
    pub fn less_than(self, field: &str, to: impl Into<JsonValue>) -> Self { self.range(field, None, Some(to.into())) }

    pub fn between(self, field: &str, from: impl Into<JsonValue>, to: impl Into<JsonValue>) -> Self {
        self.range(field, Some(from.into()), Some(to.into()))
    }

    /// `token` is `field`, `+field` or `-field`
    pub fn sorted_by(mut self, token: impl Into<String>) -> Self {
        self.sort.push(token.into());
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.page.insert("offset".to_string(), offset.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.page.insert("limit".to_string(), limit.into());
        self
    }

    pub fn build(self) -> Map<String, JsonValue> {
        let mut filter = self.filter;
        let mut page = self.page;
        if !self.sort.is_empty() {
            page.insert("sort".to_string(), JsonValue::Array(self.sort.into_iter().map(JsonValue::String).collect()));
        }
        if !page.is_empty() {
            filter.insert(DEFAULT_PAGE_KEY.to_string(), JsonValue::Object(page));
        }
        filter
    }

    fn range(mut self, field: &str, from: Option<JsonValue>, to: Option<JsonValue>) -> Self {
        let mut range = Map::new();
        if let Some(from) = from {
            range.insert("from".to_string(), from);
        }
        if let Some(to) = to {
            range.insert("to".to_string(), to);
        }
        insert_path(&mut self.filter, field, JsonValue::Object(range));
        self
    }
}

/// `a.b.c` → `{a: {b: {c: value}}}`, merging into maps already present
fn insert_path(map: &mut Map<String, JsonValue>, path: &str, value: JsonValue) {
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = map.entry(head).or_insert_with(|| JsonValue::Object(Map::new()));
            if !child.is_object() {
                *child = JsonValue::Object(Map::new());
            }
            if let JsonValue::Object(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}
