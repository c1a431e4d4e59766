//! Compiles filter nodes into a predicate tree and the joins it needs.
//!
//! Nodes fold left in encounter order: the first seeds the predicate and each later one is ANDed or
//! ORed onto it according to its own combinator. Text fields compare case-insensitively by uppercasing
//! both sides. Relation filters register an inner join and compile the related entity's sub-filter
//! with the join as its field-resolution root.

use crate::error::FilterError;
use crate::filter::{ControlFlag, DeclaredType, FilterNode, FilterTreeBuilder, Negation, Operator};
use crate::schema::{Cardinality, FieldKind, FieldSchema, RelationDef, SchemaProvider, SchemaRegistry};
use crate::value::{CasterRegistry, LocalZone, ScalarType};
use chrono::{NaiveTime, Utc};
use serde_json::Value as JsonValue;
use sieveql::ast::{ComparisonOperator, Expr, FetchMode, Join, Literal, PathExpr, Predicate};
use std::sync::Arc;
use tracing::{debug, warn};

/// Predicate plus the joins its paths traverse, parents before children
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    pub predicate: Predicate,
    pub joins: Vec<Join>,
}

pub struct PredicateCompiler<'a, P> {
    schemas: &'a SchemaRegistry<P>,
    builder: &'a FilterTreeBuilder,
    casters: &'a CasterRegistry,
    zone: &'a LocalZone,
}

impl<'a, P: SchemaProvider> PredicateCompiler<'a, P> {
    pub fn new(schemas: &'a SchemaRegistry<P>, builder: &'a FilterTreeBuilder, casters: &'a CasterRegistry, zone: &'a LocalZone) -> Self {
        Self { schemas, builder, casters, zone }
    }

    /// An empty node list compiles to `TRUE`.
    pub fn compile(&self, schema: &FieldSchema, nodes: &[FilterNode]) -> Result<CompiledFilter, FilterError> {
        let mut joins = Vec::new();
        let predicate = self.compile_level(schema, &PathExpr::root(), nodes, &mut joins)?;
        Ok(CompiledFilter { predicate, joins })
    }

    fn compile_level(&self, schema: &FieldSchema, root: &PathExpr, nodes: &[FilterNode], joins: &mut Vec<Join>) -> Result<Predicate, FilterError> {
        let mut accumulated: Option<Predicate> = None;
        for node in nodes {
            let predicate = self.compile_node(schema, root, node, joins)?;
            let predicate = match node.negate() {
                Negation::Not => predicate.negate(),
                Negation::None => predicate,
            };
            accumulated = Some(match accumulated {
                None => predicate,
                Some(accumulated) => node.combine_with().apply(accumulated, predicate),
            });
        }
        Ok(accumulated.unwrap_or(Predicate::True))
    }

    fn compile_node(&self, schema: &FieldSchema, root: &PathExpr, node: &FilterNode, joins: &mut Vec<Join>) -> Result<Predicate, FilterError> {
        validate(node)?;
        let path = root.child(node.field());
        match node.declared_type() {
            DeclaredType::Scalar(scalar) => self.compile_scalar(node, *scalar, path),
            DeclaredType::Relation { cardinality, identity, .. } => {
                let Some(FieldKind::Relation(relation)) = schema.get(node.field()) else {
                    return Err(unsupported(node));
                };
                if node.operator() == Operator::Join {
                    return self.compile_join(node, relation, path, joins);
                }
                if node.operator() == Operator::Equals && node.value().map_or(true, JsonValue::is_null) {
                    return Ok(Predicate::IsNull(Box::new(Expr::Path(path))));
                }
                let (Some(identity), Some((identity_field, _))) = (identity, &relation.target_identity) else {
                    return Err(unsupported(node));
                };
                match cardinality {
                    Cardinality::One => self.compile_scalar(node, *identity, path),
                    Cardinality::Many => {
                        // membership tests on a collection go through its members' identity
                        self.ensure_join(joins, &path, relation, FetchMode::Lazy);
                        self.compile_scalar(node, *identity, path.child(identity_field.as_str()))
                    }
                }
            }
        }
    }

    fn compile_scalar(&self, node: &FilterNode, scalar: ScalarType, path: PathExpr) -> Result<Predicate, FilterError> {
        let field = if scalar.is_text() { Expr::Upper(Box::new(Expr::Path(path.clone()))) } else { Expr::Path(path.clone()) };

        let predicate = match node.operator() {
            Operator::Equals => match node.value() {
                None | Some(JsonValue::Null) => Predicate::IsNull(Box::new(Expr::Path(path))),
                Some(value) => Predicate::compare(field, ComparisonOperator::Equal, Expr::Literal(self.literal(scalar, value)?)),
            },
            Operator::Like => {
                let pattern = match node.value() {
                    Some(JsonValue::String(s)) => s.to_uppercase(),
                    Some(other) => other.to_string().to_uppercase(),
                    None => return Err(unsupported(node)),
                };
                Predicate::Like { expr: Box::new(field), pattern }
            }
            Operator::In => {
                let mut candidates = self.casters.cast_list(scalar, node.values(), self.zone)?;
                if scalar.is_text() {
                    candidates = candidates.into_iter().map(upper).collect();
                }
                Predicate::compare(field, ComparisonOperator::In, Expr::List(candidates.into_iter().map(Expr::Literal).collect()))
            }
            Operator::Between | Operator::GreaterThan | Operator::LessThan => return self.compile_range(node, scalar, field, path),
            Operator::Join => return Err(unsupported(node)),
        };
        Ok(predicate)
    }

    /// Inclusive bounds. With the time-of-day flag, the bounds' UTC times also bound the field's time of day.
    fn compile_range(&self, node: &FilterNode, scalar: ScalarType, field: Expr, path: PathExpr) -> Result<Predicate, FilterError> {
        let from = node.from().map(|v| self.literal(scalar, v)).transpose()?;
        let to = node.to().map(|v| self.literal(scalar, v)).transpose()?;

        let mut predicate = match (&from, &to) {
            (Some(low), Some(high)) => {
                Predicate::Between { expr: Box::new(field), low: Box::new(Expr::Literal(low.clone())), high: Box::new(Expr::Literal(high.clone())) }
            }
            (Some(low), None) => Predicate::compare(field, ComparisonOperator::GreaterThanOrEqual, Expr::Literal(low.clone())),
            (None, Some(high)) => Predicate::compare(field, ComparisonOperator::LessThanOrEqual, Expr::Literal(high.clone())),
            (None, None) => return Err(FilterError::EmptyRange { field: node.field().to_string() }),
        };

        if node.has_flag(ControlFlag::TimeOfDay) {
            let time_of_day = || Expr::TimeOfDay(Box::new(Expr::Path(path.clone())));
            if let Some(low) = from.as_ref().and_then(time_of) {
                predicate = predicate.and(Predicate::compare(time_of_day(), ComparisonOperator::GreaterThanOrEqual, Expr::Literal(Literal::Time(low))));
            }
            if let Some(high) = to.as_ref().and_then(time_of) {
                predicate = predicate.and(Predicate::compare(time_of_day(), ComparisonOperator::LessThanOrEqual, Expr::Literal(Literal::Time(high))));
            }
        }
        Ok(predicate)
    }

    fn compile_join(&self, node: &FilterNode, relation: &RelationDef, path: PathExpr, joins: &mut Vec<Join>) -> Result<Predicate, FilterError> {
        let target = self.schemas.resolve(&relation.target).unwrap_or_else(|| {
            warn!("no schema for {}, the filter on {path} matches on the join alone", relation.target);
            Arc::new(FieldSchema::empty(relation.target.clone()))
        });
        self.ensure_join(joins, &path, relation, relation.fetch);

        let Some(JsonValue::Object(sub_filter)) = node.value() else {
            return Err(unsupported(node));
        };
        let (mut children, dropped) = self.builder.build_nodes(&target, sub_filter, node.combine_with())?;
        for field in dropped {
            debug!("dropping {field} from the filter on {path}: not a field of {}", target.entity());
        }
        // children follow the related entity's declaration order
        children.sort_by_key(|child| target.index_of(child.field()));

        self.compile_level(&target, &path, &children, joins)
    }

    fn ensure_join(&self, joins: &mut Vec<Join>, path: &PathExpr, relation: &RelationDef, fetch: FetchMode) {
        if joins.iter().any(|join| &join.path == path) {
            return;
        }
        let collection = match self.schemas.resolve(&relation.target) {
            Some(target) => target.collection().to_string(),
            None => relation.target.clone(),
        };
        joins.push(Join {
            path: path.clone(),
            collection,
            local_key: relation.local_key.clone(),
            foreign_key: relation.foreign_key.clone(),
            fetch,
        });
    }

    fn literal(&self, scalar: ScalarType, value: &JsonValue) -> Result<Literal, FilterError> {
        let literal = self.casters.cast_value(scalar, value, self.zone)?;
        Ok(if scalar.is_text() { upper(literal) } else { literal })
    }
}

/// Operator and type combinations that have no meaning
fn validate(node: &FilterNode) -> Result<(), FilterError> {
    let operator = node.operator();
    if operator == Operator::Join {
        return Ok(());
    }
    let Some(scalar) = node.declared_type().value_type() else {
        // a relation without identity only supports the null test
        return match (operator, node.value()) {
            (Operator::Equals, None | Some(JsonValue::Null)) => Ok(()),
            _ => Err(unsupported(node)),
        };
    };
    let rejected = (scalar.is_bool() && matches!(operator, Operator::In | Operator::Between | Operator::GreaterThan | Operator::LessThan))
        || (scalar.is_enum() && operator.is_range())
        || (operator == Operator::Like && !scalar.is_text())
        || (node.has_flag(ControlFlag::TimeOfDay) && !scalar.has_time_of_day());
    if rejected {
        return Err(unsupported(node));
    }
    Ok(())
}

fn unsupported(node: &FilterNode) -> FilterError {
    let scalar = node.declared_type().to_string();
    warn!("can't perform a {} operation with a {} for field {}", node.operator(), scalar, node.field());
    FilterError::UnsupportedOperation { operator: node.operator(), scalar, field: node.field().to_string() }
}

fn upper(literal: Literal) -> Literal {
    match literal {
        Literal::String(s) => Literal::String(s.to_uppercase()),
        Literal::Char(c) => Literal::String(c.to_uppercase().collect()),
        other => other,
    }
}

/// UTC time of day of a temporal bound
fn time_of(literal: &Literal) -> Option<NaiveTime> {
    match literal {
        Literal::DateTime(dt) => Some(dt.time()),
        Literal::Instant(instant) => Some(instant.time()),
        Literal::OffsetDateTime(odt) => Some(odt.with_timezone(&Utc).time()),
        Literal::Time(t) => Some(*t),
        Literal::Date(_) => Some(NaiveTime::MIN),
        _ => None,
    }
}
