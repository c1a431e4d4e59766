use super::{Combinator, ControlFlag, DeclaredType, FilterNode, Negation, Operator};
use crate::config::{FilterConfig, DEFAULT_PAGE_KEY};
use crate::error::FilterError;
use crate::naming::to_camel_case;
use crate::schema::{FieldKind, FieldSchema};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, trace, warn};

const NOT_KEY: &str = "NOT";
const FROM: &str = "from";
const TO: &str = "to";
const FLAGS: &str = "flags";

/// Turns a filter map into filter nodes, inferring each operator from the shape of its value.
#[derive(Debug, Clone)]
pub struct FilterTreeBuilder {
    page_key: String,
}

impl Default for FilterTreeBuilder {
    fn default() -> Self { Self { page_key: DEFAULT_PAGE_KEY.to_string() } }
}

impl FilterTreeBuilder {
    pub fn new(config: &FilterConfig) -> Self { Self { page_key: config.page_key.clone() } }

    pub fn build(&self, schema: &FieldSchema, filter: &Map<String, JsonValue>) -> Result<Vec<FilterNode>, FilterError> {
        self.build_with(schema, filter, Combinator::And)
    }

    /// Build with every node combining through `combinator`. Fails once, naming every unknown field.
    pub fn build_with(&self, schema: &FieldSchema, filter: &Map<String, JsonValue>, combinator: Combinator) -> Result<Vec<FilterNode>, FilterError> {
        let (nodes, unknown) = self.build_nodes(schema, filter, combinator)?;
        if !unknown.is_empty() {
            return Err(FilterError::UnknownFields { entity: schema.entity().to_string(), fields: unknown });
        }
        Ok(nodes)
    }

    /// Nodes in map order, and the normalized names of fields the schema does not declare.
    pub fn build_nodes(
        &self,
        schema: &FieldSchema,
        filter: &Map<String, JsonValue>,
        combinator: Combinator,
    ) -> Result<(Vec<FilterNode>, Vec<String>), FilterError> {
        let mut nodes = Vec::new();
        let mut unknown = Vec::new();

        for (key, value) in filter {
            if *key == self.page_key {
                debug!("skipping page parameter {key} in filter for {}", schema.entity());
                continue;
            }
            if key.eq_ignore_ascii_case(NOT_KEY) {
                let JsonValue::Object(negated) = value else {
                    warn!("ignoring {key} in filter for {}: expected a map, got {value}", schema.entity());
                    continue;
                };
                for (inner_key, inner_value) in negated {
                    if let Some(node) = self.node(schema, inner_key, inner_value, &mut unknown)? {
                        nodes.push(node.combined(combinator, Negation::Not));
                    }
                }
            } else if let Some(node) = self.node(schema, key, value, &mut unknown)? {
                nodes.push(node.combined(combinator, Negation::None));
            }
        }
        Ok((nodes, unknown))
    }

    fn node(&self, schema: &FieldSchema, key: &str, value: &JsonValue, unknown: &mut Vec<String>) -> Result<Option<FilterNode>, FilterError> {
        let field = to_camel_case(key);
        trace!("filter attribute {field}: {value}");
        let Some(kind) = schema.get(&field) else {
            unknown.push(field);
            return Ok(None);
        };

        let node = match kind {
            FieldKind::Scalar(scalar) => {
                let declared = DeclaredType::Scalar(*scalar);
                let node = match value {
                    JsonValue::Object(map) if !is_range(map) => FilterNode::new(field, Operator::In, declared).with_values(map.values().cloned().collect()),
                    _ => scalar_shaped(field, value, declared)?,
                };
                if scalar.is_text() {
                    uppercase(node)
                } else {
                    node
                }
            }
            FieldKind::Relation(relation) => {
                let declared = DeclaredType::Relation {
                    target: relation.target.clone(),
                    cardinality: relation.cardinality(),
                    identity: relation.target_identity.as_ref().map(|(_, scalar)| *scalar),
                };
                let text_identity = declared.value_type().is_some_and(|scalar| scalar.is_text());
                match value {
                    JsonValue::Object(map) if !is_range(map) => FilterNode::new(field, Operator::Join, declared).with_value(value.clone()),
                    _ if text_identity => uppercase(scalar_shaped(field, value, declared)?),
                    _ => scalar_shaped(field, value, declared)?,
                }
            }
        };
        Ok(Some(node))
    }
}

/// Operator inferred from a value that is not a relation filter
fn scalar_shaped(field: String, value: &JsonValue, declared: DeclaredType) -> Result<FilterNode, FilterError> {
    Ok(match value {
        JsonValue::String(s) if is_like(s) => FilterNode::new(field, Operator::Like, declared).with_value(value.clone()),
        JsonValue::Array(items) => FilterNode::new(field, Operator::In, declared).with_values(items.clone()),
        JsonValue::Object(range) => {
            let from = range.get(FROM).cloned().unwrap_or(JsonValue::Null);
            let to = range.get(TO).cloned().unwrap_or(JsonValue::Null);
            let operator = match (from.is_null(), to.is_null()) {
                (false, false) => Operator::Between,
                (false, true) => Operator::GreaterThan,
                (true, false) => Operator::LessThan,
                (true, true) => return Err(FilterError::EmptyRange { field }),
            };
            let flags = range.get(FLAGS).map(ControlFlag::parse_all).transpose()?.unwrap_or_default();
            FilterNode::new(field, operator, declared).with_values(vec![from, to]).with_flags(flags)
        }
        // null, other strings, numbers and booleans
        _ => FilterNode::new(field, Operator::Equals, declared).with_value(value.clone()),
    })
}

/// A record with `from` or `to` and nothing but `from`, `to` and `flags`
fn is_range(map: &Map<String, JsonValue>) -> bool {
    (map.contains_key(FROM) || map.contains_key(TO)) && map.keys().all(|k| k == FROM || k == TO || k == FLAGS)
}

/// Wildcard at either end
fn is_like(s: &str) -> bool { s.starts_with('%') || s.ends_with('%') }

/// Text candidates compare against an uppercased column
fn uppercase(mut node: FilterNode) -> FilterNode {
    if matches!(node.operator, Operator::Equals | Operator::Like | Operator::In) {
        node.value = node.value.map(uppercase_value);
        node.values = node.values.into_iter().map(uppercase_value).collect();
    }
    node
}

fn uppercase_value(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::String(s) => JsonValue::String(s.to_uppercase()),
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(uppercase_value).collect()),
        other => other,
    }
}
