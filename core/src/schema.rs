//! Field schemas: what an entity's filter keys may name, and what each one resolves to.
//!
//! Entities are described declaratively with [`EntityDescriptor::builder`] and handed to the resolver
//! through a [`SchemaProvider`]. [`FieldSchema::resolve`] flattens the inheritance chain into one
//! ordered field map; [`SchemaRegistry`] caches the result per entity.

mod descriptor;
mod registry;

pub use descriptor::{Catalog, EntityDescriptor, EntityDescriptorBuilder, FieldDecl, RelationDecl, RelationKind};
pub use registry::SchemaRegistry;

use crate::naming::to_snake_case;
use crate::value::ScalarType;
use indexmap::IndexMap;
use sieveql::ast::FetchMode;
use std::collections::HashSet;
use tracing::warn;

/// Source of entity descriptions
pub trait SchemaProvider: Send + Sync {
    fn descriptor(&self, entity: &str) -> Option<&EntityDescriptor>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// A resolved relation field
#[derive(Debug, Clone, PartialEq)]
pub struct RelationDef {
    /// Entity on the other side
    pub target: String,
    pub kind: RelationKind,
    pub fetch: FetchMode,
    /// Column of the owning entity
    pub local_key: String,
    /// Column of the target entity
    pub foreign_key: String,
    /// Identity field of the target and its type, when the target declares one
    pub target_identity: Option<(String, ScalarType)>,
}

impl RelationDef {
    pub fn cardinality(&self) -> Cardinality {
        match self.kind {
            RelationKind::Collection => Cardinality::Many,
            RelationKind::Entity | RelationKind::Record => Cardinality::One,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Scalar(ScalarType),
    Relation(RelationDef),
}

impl FieldKind {
    pub fn is_relation(&self) -> bool { matches!(self, FieldKind::Relation(_)) }
}

/// Every field an entity declares, its own and inherited, in declaration order (base entities first).
///
/// Read-only once resolved, so it can be shared across requests.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    entity: String,
    collection: String,
    identity: Option<String>,
    fields: IndexMap<String, FieldKind>,
}

impl FieldSchema {
    /// Schema with no fields. Every filter key against it is unknown.
    pub fn empty(entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self { collection: entity.clone(), entity, identity: None, fields: IndexMap::new() }
    }

    /// Flatten the entity's inheritance chain. The most derived declaration of a name wins.
    /// A base the provider does not know ends the chain. `None` if the entity itself is unknown.
    pub fn resolve<P: SchemaProvider + ?Sized>(provider: &P, entity: &str) -> Option<Self> {
        let chain = inheritance_chain(provider, entity);
        let most_derived = *chain.first()?;

        let mut fields = IndexMap::new();
        let mut identity = None;
        for descriptor in chain.iter().rev() {
            if let Some(id) = descriptor.identity() {
                identity = Some(id.to_string());
            }
            for (name, decl) in descriptor.fields() {
                let kind = match decl {
                    FieldDecl::Scalar(scalar) => FieldKind::Scalar(*scalar),
                    FieldDecl::Relation(relation) => FieldKind::Relation(resolve_relation(provider, most_derived, name, relation)),
                };
                fields.insert(name.clone(), kind);
            }
        }

        Some(Self { entity: entity.to_string(), collection: most_derived.collection().to_string(), identity, fields })
    }

    pub fn entity(&self) -> &str { &self.entity }

    /// Collection rows of this entity are stored in
    pub fn collection(&self) -> &str { &self.collection }

    pub fn get(&self, field: &str) -> Option<&FieldKind> { self.fields.get(field) }

    pub fn contains(&self, field: &str) -> bool { self.fields.contains_key(field) }

    /// Declaration position of a field
    pub fn index_of(&self, field: &str) -> Option<usize> { self.fields.get_index_of(field) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldKind)> { self.fields.iter().map(|(name, kind)| (name.as_str(), kind)) }

    pub fn len(&self) -> usize { self.fields.len() }

    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    pub fn identity(&self) -> Option<&str> { self.identity.as_deref() }

    pub fn identity_type(&self) -> Option<ScalarType> {
        match self.fields.get(self.identity.as_deref()?)? {
            FieldKind::Scalar(scalar) => Some(*scalar),
            FieldKind::Relation(_) => None,
        }
    }
}

/// Most derived first
fn inheritance_chain<'a, P: SchemaProvider + ?Sized>(provider: &'a P, entity: &str) -> Vec<&'a EntityDescriptor> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut next = Some(entity.to_string());
    while let Some(name) = next.take() {
        if !seen.insert(name.clone()) {
            warn!("inheritance cycle at {name}");
            break;
        }
        let Some(descriptor) = provider.descriptor(&name) else { break };
        next = descriptor.base().map(str::to_string);
        chain.push(descriptor);
    }
    chain
}

/// Identity of `entity` looked up along its own chain, without resolving its relations
fn identity_of<P: SchemaProvider + ?Sized>(provider: &P, entity: &str) -> Option<(String, ScalarType)> {
    let chain = inheritance_chain(provider, entity);
    let name = chain.iter().find_map(|d| d.identity())?;
    let scalar = chain.iter().find_map(|d| match d.field(name) {
        Some(FieldDecl::Scalar(scalar)) => Some(*scalar),
        _ => None,
    })?;
    Some((name.to_string(), scalar))
}

fn resolve_relation<P: SchemaProvider + ?Sized>(provider: &P, owner: &EntityDescriptor, field: &str, decl: &RelationDecl) -> RelationDef {
    let target_identity = identity_of(provider, &decl.target);
    if provider.descriptor(&decl.target).is_none() {
        warn!("relation {}.{} points at unknown entity {}", owner.name(), field, decl.target);
    }
    let (local_key, foreign_key) = match decl.kind {
        RelationKind::Collection => (
            decl.local_key.clone().unwrap_or_else(|| identity_of(provider, owner.name()).map(|(id, _)| id).unwrap_or_else(|| "id".to_string())),
            decl.foreign_key.clone().unwrap_or_else(|| format!("{}_id", to_snake_case(owner.name()))),
        ),
        RelationKind::Entity | RelationKind::Record => (
            decl.local_key.clone().unwrap_or_else(|| format!("{}_id", to_snake_case(field))),
            decl.foreign_key.clone().unwrap_or_else(|| target_identity.as_ref().map(|(id, _)| id.clone()).unwrap_or_else(|| "id".to_string())),
        ),
    };
    RelationDef { target: decl.target.clone(), kind: decl.kind, fetch: decl.fetch, local_key, foreign_key, target_identity }
}
