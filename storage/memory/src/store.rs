use crate::record::Record;
use crate::rows::{sort_rows, RowRef, RowStream};
use indexmap::IndexMap;
use sieve_core::{Executor, RetrievalError};
use sieveql::ast::Selection;
use std::sync::RwLock;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("store lock poisoned")]
    Poisoned,
}

/// Records per collection, in insertion order
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<IndexMap<String, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&self, collection: &str, record: Record) -> Result<(), MemoryError> {
        let mut collections = self.collections.write().map_err(|_| MemoryError::Poisoned)?;
        collections.entry(collection.to_string()).or_default().push(record);
        Ok(())
    }

    pub fn insert_all(&self, collection: &str, records: impl IntoIterator<Item = Record>) -> Result<(), MemoryError> {
        let mut collections = self.collections.write().map_err(|_| MemoryError::Poisoned)?;
        collections.entry(collection.to_string()).or_default().extend(records);
        Ok(())
    }

    pub fn len(&self, collection: &str) -> usize { self.collections.read().map(|c| c.get(collection).map_or(0, Vec::len)).unwrap_or(0) }

    /// Matching records before order, offset and limit are applied
    fn matching<T>(&self, collection: &str, selection: &Selection, f: impl FnOnce(Vec<RowRef<'_>>) -> T) -> Result<T, RetrievalError> {
        let collections = self.collections.read().map_err(|_| RetrievalError::storage(MemoryError::Poisoned))?;
        let Some(records) = collections.get(collection) else {
            debug!("no records in {collection}");
            return Ok(f(Vec::new()));
        };
        let rows = records.iter().map(|record| RowRef { collections: &collections, collection, record });
        let matched = rows.filter_rows(&selection.predicate, &selection.joins).map_err(RetrievalError::storage)?;
        Ok(f(matched))
    }
}

impl Executor for MemoryStore {
    type Row = Record;

    fn fetch(&self, collection: &str, selection: &Selection) -> Result<Vec<Record>, RetrievalError> {
        self.matching(collection, selection, |mut rows| {
            if let Some(order_by) = &selection.order_by {
                sort_rows(&mut rows, order_by);
            }
            let offset = selection.offset.unwrap_or(0) as usize;
            let limit = selection.limit.map_or(usize::MAX, |l| l as usize);
            rows.into_iter().skip(offset).take(limit).map(|row| row.record().clone()).collect()
        })
    }

    fn count(&self, collection: &str, selection: &Selection) -> Result<u64, RetrievalError> {
        self.matching(collection, selection, |rows| rows.len() as u64)
    }
}
