use indexmap::IndexMap;
use sieveql::ast::Literal;

/// Keys of the records a relation points at, in the target collection
#[derive(Debug, Clone, PartialEq)]
pub enum Links {
    One { collection: String, key: Option<Literal> },
    Many { collection: String, keys: Vec<Literal> },
}

impl Links {
    pub fn collection(&self) -> &str {
        match self {
            Links::One { collection, .. } | Links::Many { collection, .. } => collection,
        }
    }

    pub fn keys(&self) -> Vec<&Literal> {
        match self {
            Links::One { key, .. } => key.iter().collect(),
            Links::Many { keys, .. } => keys.iter().collect(),
        }
    }
}

/// One stored row: scalar values by field name, plus relation links.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    key: Literal,
    fields: IndexMap<String, Literal>,
    links: IndexMap<String, Links>,
}

impl Record {
    /// A record identified by `identity`, which is also stored as a field
    pub fn new(identity: &str, key: impl Into<Literal>) -> Self {
        let key = key.into();
        let mut fields = IndexMap::new();
        fields.insert(identity.to_string(), key.clone());
        Self { key, fields, links: IndexMap::new() }
    }

    pub fn set(mut self, field: &str, value: impl Into<Literal>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// To-one link onto the record with `key` in `collection`
    pub fn link(mut self, relation: &str, collection: &str, key: impl Into<Literal>) -> Self {
        let key = Some(key.into()).filter(|k| !k.is_null());
        self.links.insert(relation.to_string(), Links::One { collection: collection.to_string(), key });
        self
    }

    pub fn link_many<K: Into<Literal>>(mut self, relation: &str, collection: &str, keys: impl IntoIterator<Item = K>) -> Self {
        let keys = keys.into_iter().map(Into::into).collect();
        self.links.insert(relation.to_string(), Links::Many { collection: collection.to_string(), keys });
        self
    }

    pub fn key(&self) -> &Literal { &self.key }

    pub fn get(&self, field: &str) -> Option<&Literal> { self.fields.get(field) }

    pub fn links(&self, relation: &str) -> Option<&Links> { self.links.get(relation) }
}
