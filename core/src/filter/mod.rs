//! Filter nodes: one typed condition per filter-map entry.
//!
//! [`FilterTreeBuilder`] produces them from an untyped map; the predicate compiler reads them and never
//! mutates them.

mod builder;
mod map;

pub use builder::FilterTreeBuilder;
pub use map::FilterMap;

use crate::error::FilterError;
use crate::schema::Cardinality;
use crate::value::ScalarType;
use serde_json::Value as JsonValue;
use sieveql::ast::Predicate;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    Like,
    In,
    Between,
    GreaterThan,
    LessThan,
    Join,
}

impl Operator {
    pub fn is_range(&self) -> bool { matches!(self, Operator::Between | Operator::GreaterThan | Operator::LessThan) }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::Equals => "EQUALS",
            Operator::Like => "LIKE",
            Operator::In => "IN",
            Operator::Between => "BETWEEN",
            Operator::GreaterThan => "GREATER_THAN",
            Operator::LessThan => "LESS_THAN",
            Operator::Join => "JOIN",
        })
    }
}

/// How a node combines with the siblings before it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub fn apply(self, accumulated: Predicate, next: Predicate) -> Predicate {
        match self {
            Combinator::And => accumulated.and(next),
            Combinator::Or => accumulated.or(next),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Negation {
    #[default]
    None,
    Not,
}

/// Node-level behavior modifiers carried by a range record's `flags` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlFlag {
    /// Additionally compare only the UTC time of day against the bounds' time of day
    TimeOfDay,
}

impl FromStr for ControlFlag {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DATE_TIME_SPLIT" | "TIME_OF_DAY" => Ok(ControlFlag::TimeOfDay),
            _ => Err(FilterError::UnknownControlFlag { flag: s.to_string() }),
        }
    }
}

impl ControlFlag {
    /// Flags given as a comma separated string or a list of strings
    pub fn parse_all(value: &JsonValue) -> Result<Vec<ControlFlag>, FilterError> {
        let mut flags = Vec::new();
        match value {
            JsonValue::Null => {}
            JsonValue::String(s) => {
                for token in s.split(',').filter(|t| !t.trim().is_empty()) {
                    flags.push(token.parse()?);
                }
            }
            JsonValue::Array(items) => {
                for item in items {
                    match item {
                        JsonValue::String(s) => flags.push(s.parse()?),
                        other => return Err(FilterError::UnknownControlFlag { flag: other.to_string() }),
                    }
                }
            }
            other => return Err(FilterError::UnknownControlFlag { flag: other.to_string() }),
        }
        flags.sort();
        flags.dedup();
        Ok(flags)
    }
}

/// What the node's field resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredType {
    Scalar(ScalarType),
    Relation { target: String, cardinality: Cardinality, identity: Option<ScalarType> },
}

impl DeclaredType {
    /// Type the node's values are cast to. For relations, the target's identity.
    pub fn value_type(&self) -> Option<ScalarType> {
        match self {
            DeclaredType::Scalar(scalar) => Some(*scalar),
            DeclaredType::Relation { identity, .. } => *identity,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Scalar(scalar) => scalar.fmt(f),
            DeclaredType::Relation { target, cardinality: Cardinality::One, .. } => write!(f, "{target}"),
            DeclaredType::Relation { target, cardinality: Cardinality::Many, .. } => write!(f, "collection of {target}"),
        }
    }
}

/// One leaf condition and how it combines with its siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterNode {
    field: String,
    operator: Operator,
    value: Option<JsonValue>,
    values: Vec<JsonValue>,
    is_related_entity: bool,
    declared_type: DeclaredType,
    combine_with: Combinator,
    negate: Negation,
    control_flags: Vec<ControlFlag>,
}

impl FilterNode {
    pub(crate) fn new(field: String, operator: Operator, declared_type: DeclaredType) -> Self {
        let is_related_entity = matches!(declared_type, DeclaredType::Relation { .. });
        Self {
            field,
            operator,
            value: None,
            values: Vec::new(),
            is_related_entity,
            declared_type,
            combine_with: Combinator::And,
            negate: Negation::None,
            control_flags: Vec::new(),
        }
    }

    pub(crate) fn with_value(mut self, value: JsonValue) -> Self {
        self.value = Some(value);
        self
    }

    pub(crate) fn with_values(mut self, values: Vec<JsonValue>) -> Self {
        self.values = values;
        self
    }

    pub(crate) fn with_flags(mut self, flags: Vec<ControlFlag>) -> Self {
        self.control_flags = flags;
        self
    }

    pub(crate) fn combined(mut self, combine_with: Combinator, negate: Negation) -> Self {
        self.combine_with = combine_with;
        self.negate = negate;
        self
    }

    pub fn field(&self) -> &str { &self.field }

    pub fn operator(&self) -> Operator { self.operator }

    /// Single input of `Equals`, `Like` and `Join`
    pub fn value(&self) -> Option<&JsonValue> { self.value.as_ref() }

    /// Candidates of `In`, or the `[from, to]` pair of a range with `null` in an absent slot
    pub fn values(&self) -> &[JsonValue] { &self.values }

    pub fn from(&self) -> Option<&JsonValue> { self.values.first().filter(|v| !v.is_null()) }

    pub fn to(&self) -> Option<&JsonValue> { self.values.get(1).filter(|v| !v.is_null()) }

    pub fn is_related_entity(&self) -> bool { self.is_related_entity }

    pub fn declared_type(&self) -> &DeclaredType { &self.declared_type }

    pub fn combine_with(&self) -> Combinator { self.combine_with }

    pub fn negate(&self) -> Negation { self.negate }

    pub fn control_flags(&self) -> &[ControlFlag] { &self.control_flags }

    pub fn has_flag(&self, flag: ControlFlag) -> bool { self.control_flags.contains(&flag) }
}
