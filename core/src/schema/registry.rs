use super::{FieldSchema, SchemaProvider};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Resolves field schemas on first use and shares them afterwards.
pub struct SchemaRegistry<P> {
    provider: P,
    cache: DashMap<String, Arc<FieldSchema>>,
}

impl<P: SchemaProvider> SchemaRegistry<P> {
    pub fn new(provider: P) -> Self { Self { provider, cache: DashMap::new() } }

    pub fn provider(&self) -> &P { &self.provider }

    /// `None` if the provider does not know the entity
    pub fn resolve(&self, entity: &str) -> Option<Arc<FieldSchema>> {
        if let Some(schema) = self.cache.get(entity) {
            return Some(schema.clone());
        }
        let schema = Arc::new(FieldSchema::resolve(&self.provider, entity)?);
        debug!("resolved schema for {entity} with {} fields", schema.len());
        // a concurrent first resolution may have won; keep whichever landed first
        Some(self.cache.entry(entity.to_string()).or_insert(schema).clone())
    }

    pub fn cached(&self) -> usize { self.cache.len() }
}
