//! Runs filter maps end to end: schema lookup, node building, compilation, paging and execution.

use crate::compiler::{CompiledFilter, PredicateCompiler};
use crate::config::FilterConfig;
use crate::error::{ConfigError, FilterError, RetrievalError};
use crate::filter::FilterTreeBuilder;
use crate::pagination::{PageResult, PageSpec, PaginationBuilder};
use crate::schema::{FieldKind, FieldSchema, SchemaProvider, SchemaRegistry};
use crate::value::{CasterRegistry, LocalZone};
use serde_json::{Map, Value as JsonValue};
use sieveql::ast::{OrderByItem, Predicate, Selection};
use std::sync::Arc;
use tracing::debug;

/// Executes selections against a collection.
pub trait Executor {
    type Row;

    /// Matching rows, honoring the selection's order, limit and offset
    fn fetch(&self, collection: &str, selection: &Selection) -> Result<Vec<Self::Row>, RetrievalError>;

    /// Number of matching rows, ignoring order, limit and offset
    fn count(&self, collection: &str, selection: &Selection) -> Result<u64, RetrievalError>;
}

/// Additional predicate ANDed onto every compiled filter of an entity, such as soft-delete or tenancy rules.
pub trait ExtraCriteria: Send + Sync {
    fn predicate(&self, schema: &FieldSchema) -> Option<Predicate>;
}

impl<F> ExtraCriteria for F
where F: Fn(&FieldSchema) -> Option<Predicate> + Send + Sync
{
    fn predicate(&self, schema: &FieldSchema) -> Option<Predicate> { self(schema) }
}

pub struct FilterService<P, X> {
    schemas: SchemaRegistry<P>,
    executor: X,
    builder: FilterTreeBuilder,
    pagination: PaginationBuilder,
    casters: CasterRegistry,
    zone: LocalZone,
    extra: Option<Box<dyn ExtraCriteria>>,
}

impl<P: SchemaProvider, X: Executor> FilterService<P, X> {
    pub fn new(provider: P, executor: X) -> Self {
        let config = FilterConfig::default();
        Self {
            schemas: SchemaRegistry::new(provider),
            executor,
            builder: FilterTreeBuilder::new(&config),
            pagination: PaginationBuilder::new(&config),
            casters: CasterRegistry::with_defaults(),
            zone: LocalZone::System,
            extra: None,
        }
    }

    pub fn with_config(provider: P, executor: X, config: &FilterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut service = Self::new(provider, executor);
        service.builder = FilterTreeBuilder::new(config);
        service.pagination = PaginationBuilder::new(config);
        service.zone = config.zone()?;
        Ok(service)
    }

    pub fn with_casters(mut self, casters: CasterRegistry) -> Self {
        self.casters = casters;
        self
    }

    pub fn with_extra_criteria(mut self, extra: impl ExtraCriteria + 'static) -> Self {
        self.extra = Some(Box::new(extra));
        self
    }

    pub fn schemas(&self) -> &SchemaRegistry<P> { &self.schemas }

    pub fn executor(&self) -> &X { &self.executor }

    /// Compiled selection for a filter map. Limit and offset are set only when the page key is present.
    pub fn selection(&self, entity: &str, filter: &Map<String, JsonValue>) -> Result<Selection, RetrievalError> {
        let (schema, mut selection) = self.compile(entity, filter)?;
        let page = self.pagination.extract(filter)?;
        selection.order_by = order_by(&schema, &page)?;
        if self.pagination.is_requested(filter) {
            selection.limit = Some(page.limit);
            selection.offset = Some(page.offset);
        }
        Ok(selection)
    }

    /// Every matching row, in the requested sort order. Limit and offset are not applied.
    pub fn filter(&self, entity: &str, filter: &Map<String, JsonValue>) -> Result<Vec<X::Row>, RetrievalError> {
        let (schema, mut selection) = self.compile(entity, filter)?;
        selection.order_by = order_by(&schema, &self.pagination.extract(filter)?)?;
        self.executor.fetch(schema.collection(), &selection)
    }

    /// One page of matching rows, paged by the filter's page key or the default page.
    pub fn page_filter(&self, entity: &str, filter: &Map<String, JsonValue>) -> Result<PageResult<X::Row>, RetrievalError> {
        let page = self.pagination.extract(filter)?;
        self.page_filter_with(entity, filter, page)
    }

    /// One page of matching rows, paged by `page`. A page key in the filter is ignored.
    pub fn page_filter_with(&self, entity: &str, filter: &Map<String, JsonValue>, page: PageSpec) -> Result<PageResult<X::Row>, RetrievalError> {
        let (schema, mut selection) = self.compile(entity, filter)?;
        selection.order_by = order_by(&schema, &page)?;
        let total_rows = self.executor.count(schema.collection(), &selection)?;

        selection.limit = Some(page.limit);
        selection.offset = Some(page.offset);
        let items = self.executor.fetch(schema.collection(), &selection)?;
        debug!("{entity}: {} of {total_rows} rows at offset {}", items.len(), page.offset);
        Ok(PageResult::new(items, &page, total_rows))
    }

    fn compile(&self, entity: &str, filter: &Map<String, JsonValue>) -> Result<(Arc<FieldSchema>, Selection), RetrievalError> {
        let schema = self.schemas.resolve(entity).ok_or_else(|| RetrievalError::UnknownEntity(entity.to_string()))?;
        let criteria = self.pagination.strip(filter);
        let nodes = self.builder.build(&schema, &criteria)?;

        let compiler = PredicateCompiler::new(&self.schemas, &self.builder, &self.casters, &self.zone);
        let CompiledFilter { predicate, joins } = compiler.compile(&schema, &nodes)?;
        let predicate = match self.extra.as_ref().and_then(|extra| extra.predicate(&schema)) {
            Some(extra) if predicate == Predicate::True => extra,
            Some(extra) => predicate.and(extra),
            None => predicate,
        };
        debug!("{entity}: {predicate} with {} joins", joins.len());

        let mut selection = Selection::new(predicate);
        selection.joins = joins;
        Ok((schema, selection))
    }
}

/// Sort tokens must name scalar fields of the entity
fn order_by(schema: &FieldSchema, page: &PageSpec) -> Result<Option<Vec<OrderByItem>>, FilterError> {
    if page.sort.is_empty() {
        return Ok(None);
    }
    for token in &page.sort {
        if !matches!(schema.get(&token.field), Some(FieldKind::Scalar(_))) {
            return Err(FilterError::InvalidSortToken { token: token.field.clone(), reason: "not a sortable field" });
        }
    }
    Ok(Some(page.order_by()))
}
