use crate::record::{Links, Record};
use indexmap::IndexMap;
use sieveql::ast::{Join, Literal, OrderByItem, OrderDirection, Predicate};
use sieveql::collation::sort_order;
use sieveql::error::EvaluationError;
use sieveql::selection::filter::{FilterIterator, FilterResult, Filterable};
use std::cmp::Ordering;

/// A record seen through the collections it can join into
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    pub(crate) collections: &'a IndexMap<String, Vec<Record>>,
    pub(crate) collection: &'a str,
    pub(crate) record: &'a Record,
}

impl<'a> RowRef<'a> {
    pub fn record(&self) -> &'a Record { self.record }
}

impl Filterable for RowRef<'_> {
    fn collection(&self) -> &str { self.collection }

    /// A to-one relation reads as the linked key, a to-many one as NULL when empty.
    fn value(&self, name: &str) -> Option<Literal> {
        if let Some(value) = self.record.get(name) {
            return Some(value.clone());
        }
        match self.record.links(name)? {
            Links::One { key, .. } => Some(key.clone().unwrap_or(Literal::Null)),
            Links::Many { keys, .. } => Some(keys.first().cloned().unwrap_or(Literal::Null)),
        }
    }

    /// An unlinked relation joins nothing
    fn related(&self, name: &str) -> Option<Vec<Self>> {
        let Some(links) = self.record.links(name) else {
            return if self.record.get(name).is_some() { None } else { Some(Vec::new()) };
        };
        let Some(targets) = self.collections.get(links.collection()) else {
            return Some(Vec::new());
        };
        let related = links
            .keys()
            .into_iter()
            .filter_map(|key| targets.iter().find(|target| target.key() == key))
            .map(|record| RowRef { collections: self.collections, collection: links.collection(), record })
            .collect();
        Some(related)
    }
}

/// Filtering, sorting and windowing over rows
pub trait RowStream<'a>: Iterator<Item = RowRef<'a>> + Sized {
    /// Rows satisfying the predicate. The first evaluation error ends the stream with that error.
    fn filter_rows(self, predicate: &Predicate, joins: &[Join]) -> Result<Vec<RowRef<'a>>, EvaluationError> {
        let mut passed = Vec::new();
        for result in FilterIterator::new(self, predicate.clone(), joins.to_vec()) {
            match result {
                FilterResult::Pass(row) => passed.push(row),
                FilterResult::Skip(_) => {}
                FilterResult::Error(_, e) => return Err(e),
            }
        }
        Ok(passed)
    }
}

impl<'a, I: Iterator<Item = RowRef<'a>>> RowStream<'a> for I {}

/// Nulls sort last ascending and first descending
pub(crate) fn sort_rows(rows: &mut [RowRef<'_>], order_by: &[OrderByItem]) {
    rows.sort_by(|a, b| {
        for item in order_by {
            let property = item.path.property();
            let a_val = a.value(property).unwrap_or(Literal::Null);
            let b_val = b.value(property).unwrap_or(Literal::Null);
            let cmp = match item.direction {
                OrderDirection::Asc => sort_order(&a_val, &b_val),
                OrderDirection::Desc => sort_order(&b_val, &a_val),
            };
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    });
}
