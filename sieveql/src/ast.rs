use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    Path(PathExpr),
    /// Upper-cased text value of the inner expression
    Upper(Box<Expr>),
    /// UTC-normalised hour:minute:second of a temporal expression
    TimeOfDay(Box<Expr>),
    List(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    BigInt(BigInt),
    Decimal(Decimal),
    F32(f32),
    F64(f64),
    Bool(bool),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Instant(DateTime<Utc>),
    OffsetDateTime(DateTime<FixedOffset>),
    /// Canonical member name of an enumerated value
    Enum(String),
    Null,
}

impl Literal {
    pub fn is_null(&self) -> bool { matches!(self, Literal::Null) }
}

/// A dotted property path. Every step but the last names a joined relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathExpr {
    pub steps: Vec<String>,
}

impl PathExpr {
    pub fn simple(name: impl Into<String>) -> Self { Self { steps: vec![name.into()] } }

    /// The root path, which addresses the record being filtered rather than one of its relations.
    pub fn root() -> Self { Self { steps: Vec::new() } }

    pub fn is_root(&self) -> bool { self.steps.is_empty() }

    pub fn is_simple(&self) -> bool { self.steps.len() == 1 }

    pub fn first(&self) -> &str { self.steps.first().map(String::as_str).unwrap_or_default() }

    /// Final step of the path, the property being read
    pub fn property(&self) -> &str { self.steps.last().map(String::as_str).unwrap_or_default() }

    /// Every step but the last, addressing the record that owns the property
    pub fn parent(&self) -> PathExpr {
        let len = self.steps.len().saturating_sub(1);
        PathExpr { steps: self.steps[..len].to_vec() }
    }

    pub fn child(&self, name: impl Into<String>) -> PathExpr {
        let mut steps = self.steps.clone();
        steps.push(name.into());
        PathExpr { steps }
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.steps.join(".")) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    Comparison {
        left: Box<Expr>,
        operator: ComparisonOperator,
        right: Box<Expr>,
    },
    /// SQL `LIKE` with `%` and `_` wildcards
    Like {
        expr: Box<Expr>,
        pattern: String,
    },
    /// Inclusive on both ends
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    IsNull(Box<Expr>),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    True,
    False,
}

impl Predicate {
    pub fn and(self, other: Predicate) -> Predicate { Predicate::And(Box::new(self), Box::new(other)) }

    pub fn or(self, other: Predicate) -> Predicate { Predicate::Or(Box::new(self), Box::new(other)) }

    pub fn negate(self) -> Predicate { Predicate::Not(Box::new(self)) }

    pub fn compare(left: Expr, operator: ComparisonOperator, right: Expr) -> Predicate {
        Predicate::Comparison { left: Box::new(left), operator, right: Box::new(right) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Equal,              // =
    NotEqual,           // <>
    GreaterThan,        // >
    GreaterThanOrEqual, // >=
    LessThan,           // <
    LessThanOrEqual,    // <=
    In,                 // IN
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchMode {
    /// Related records are loaded together with the owning record
    #[default]
    Eager,
    Lazy,
}

/// Inner join onto a relation of an already joined (or the root) record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub path: PathExpr,
    /// Collection the relation points at
    pub collection: String,
    /// Column of the owning record matched against `foreign_key`
    pub local_key: String,
    /// Column of the related record matched against `local_key`
    pub foreign_key: String,
    pub fetch: FetchMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByItem {
    pub path: PathExpr,
    pub direction: OrderDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub predicate: Predicate,
    pub joins: Vec<Join>,
    pub order_by: Option<Vec<OrderByItem>>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Selection {
    pub fn new(predicate: Predicate) -> Self { Self { predicate, joins: Vec::new(), order_by: None, limit: None, offset: None } }

    pub fn find_join(&self, path: &PathExpr) -> Option<&Join> { self.joins.iter().find(|j| &j.path == path) }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Char(c) => write!(f, "'{}'", c),
            Literal::I8(i) => write!(f, "{}", i),
            Literal::I16(i) => write!(f, "{}", i),
            Literal::I32(i) => write!(f, "{}", i),
            Literal::I64(i) => write!(f, "{}", i),
            Literal::BigInt(i) => write!(f, "{}", i),
            Literal::Decimal(d) => write!(f, "{}", d),
            Literal::F32(v) => write!(f, "{}", v),
            Literal::F64(v) => write!(f, "{}", v),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Uuid(u) => write!(f, "'{}'", u),
            Literal::Date(d) => write!(f, "'{}'", d),
            Literal::Time(t) => write!(f, "'{}'", t),
            Literal::DateTime(dt) => write!(f, "'{}'", dt),
            Literal::Instant(i) => write!(f, "'{}'", i.to_rfc3339()),
            Literal::OffsetDateTime(o) => write!(f, "'{}'", o.to_rfc3339()),
            Literal::Enum(name) => write!(f, "'{}'", name),
            Literal::Null => write!(f, "NULL"),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "<>",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanOrEqual => "<=",
            ComparisonOperator::In => "IN",
        };
        f.write_str(op)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Path(path) => write!(f, "{}", path),
            Expr::Upper(inner) => write!(f, "UPPER({})", inner),
            Expr::TimeOfDay(inner) => write!(f, "TIME({})", inner),
            Expr::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Comparison { left, operator, right } => write!(f, "{} {} {}", left, operator, right),
            Predicate::Like { expr, pattern } => write!(f, "{} LIKE {}", expr, Literal::String(pattern.clone())),
            Predicate::Between { expr, low, high } => write!(f, "{} BETWEEN {} AND {}", expr, low, high),
            Predicate::IsNull(expr) => write!(f, "{} IS NULL", expr),
            Predicate::And(left, right) => write!(f, "{} AND {}", left, right),
            Predicate::Or(left, right) => write!(f, "({} OR {})", left, right),
            Predicate::Not(inner) => write!(f, "NOT ({})", inner),
            Predicate::True => f.write_str("TRUE"),
            Predicate::False => f.write_str("FALSE"),
        }
    }
}
