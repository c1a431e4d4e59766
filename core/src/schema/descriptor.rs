use super::SchemaProvider;
use crate::value::ScalarType;
use indexmap::IndexMap;
use sieveql::ast::FetchMode;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// To-one reference to another entity
    Entity,
    /// To-many
    Collection,
    /// Embedded map or record type, to-one
    Record,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationDecl {
    pub target: String,
    pub kind: RelationKind,
    pub fetch: FetchMode,
    /// Overrides for the conventional join columns
    pub local_key: Option<String>,
    pub foreign_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldDecl {
    Scalar(ScalarType),
    Relation(RelationDecl),
}

/// Fields one entity declares itself, plus the name of the entity it extends.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    name: String,
    collection: Option<String>,
    base: Option<String>,
    identity: Option<String>,
    fields: IndexMap<String, FieldDecl>,
}

impl EntityDescriptor {
    pub fn builder(name: impl Into<String>) -> EntityDescriptorBuilder {
        EntityDescriptorBuilder {
            descriptor: EntityDescriptor { name: name.into(), collection: None, base: None, identity: None, fields: IndexMap::new() },
            last_relation: None,
        }
    }

    pub fn name(&self) -> &str { &self.name }

    /// Storage collection, the entity name unless overridden
    pub fn collection(&self) -> &str { self.collection.as_deref().unwrap_or(&self.name) }

    pub fn base(&self) -> Option<&str> { self.base.as_deref() }

    pub fn identity(&self) -> Option<&str> { self.identity.as_deref() }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldDecl)> { self.fields.iter() }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> { self.fields.get(name) }
}

pub struct EntityDescriptorBuilder {
    descriptor: EntityDescriptor,
    last_relation: Option<String>,
}

impl EntityDescriptorBuilder {
    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.descriptor.base = Some(base.into());
        self
    }

    pub fn stored_in(mut self, collection: impl Into<String>) -> Self {
        self.descriptor.collection = Some(collection.into());
        self
    }

    pub fn identity(mut self, field: impl Into<String>) -> Self {
        self.descriptor.identity = Some(field.into());
        self
    }

    pub fn scalar(mut self, name: impl Into<String>, scalar: ScalarType) -> Self {
        self.descriptor.fields.insert(name.into(), FieldDecl::Scalar(scalar));
        self
    }

    pub fn entity(self, name: impl Into<String>, target: impl Into<String>) -> Self { self.relation(name.into(), target.into(), RelationKind::Entity) }

    pub fn collection(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relation(name.into(), target.into(), RelationKind::Collection)
    }

    pub fn record(self, name: impl Into<String>, target: impl Into<String>) -> Self { self.relation(name.into(), target.into(), RelationKind::Record) }

    /// Fetch policy of the relation declared last
    pub fn fetch(mut self, fetch: FetchMode) -> Self {
        match self.last_relation_mut() {
            Some(relation) => relation.fetch = fetch,
            None => warn!("fetch({fetch:?}) on {} has no relation to apply to", self.descriptor.name),
        }
        self
    }

    /// Join columns of the relation declared last
    pub fn join_on(mut self, local_key: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        match self.last_relation_mut() {
            Some(relation) => {
                relation.local_key = Some(local_key.into());
                relation.foreign_key = Some(foreign_key.into());
            }
            None => warn!("join_on on {} has no relation to apply to", self.descriptor.name),
        }
        self
    }

    pub fn build(self) -> EntityDescriptor { self.descriptor }

    fn relation(mut self, name: String, target: String, kind: RelationKind) -> Self {
        let decl = RelationDecl { target, kind, fetch: FetchMode::default(), local_key: None, foreign_key: None };
        self.descriptor.fields.insert(name.clone(), FieldDecl::Relation(decl));
        self.last_relation = Some(name);
        self
    }

    fn last_relation_mut(&mut self) -> Option<&mut RelationDecl> {
        match self.descriptor.fields.get_mut(self.last_relation.as_deref()?)? {
            FieldDecl::Relation(relation) => Some(relation),
            FieldDecl::Scalar(_) => None,
        }
    }
}

/// Descriptors keyed by entity name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entities: IndexMap<String, EntityDescriptor>,
}

impl Catalog {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, descriptor: EntityDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    /// Replaces any descriptor of the same name
    pub fn insert(&mut self, descriptor: EntityDescriptor) { self.entities.insert(descriptor.name.clone(), descriptor); }

    pub fn entities(&self) -> impl Iterator<Item = &EntityDescriptor> { self.entities.values() }
}

impl SchemaProvider for Catalog {
    fn descriptor(&self, entity: &str) -> Option<&EntityDescriptor> { self.entities.get(entity) }
}
