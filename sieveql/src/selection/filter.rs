//! Filter records based on a predicate. This is the in-memory predicate sink: it evaluates a compiled
//! predicate tree directly against records, following SQL semantics so that results agree with the SQL sink.
//!
//! Comparisons involving NULL are *unknown*, `NOT unknown` stays unknown, and a record passes only when the
//! predicate is *true*. Joins behave as inner joins: a record matches when at least one combination of its
//! joined related records satisfies the predicate, and a record with nothing to join against never matches.

use crate::ast::{ComparisonOperator, Expr, Join, Literal, PathExpr, Predicate};
use crate::collation::{Collation, RangeBound};
use crate::error::EvaluationError;
use chrono::{NaiveTime, Utc};
use std::cmp::Ordering;

pub trait Filterable: Sized {
    fn collection(&self) -> &str;

    /// Value of a scalar property. A missing property reads as NULL.
    fn value(&self, name: &str) -> Option<Literal>;

    /// Records on the other side of a relation. `None` if the record has no such relation,
    /// an empty list for an unset to-one or empty to-many relation.
    fn related(&self, name: &str) -> Option<Vec<Self>>;
}

/// One combination of joined records, keyed by the join path that produced each of them.
struct Binding<R> {
    entries: Vec<(PathExpr, R)>,
}

impl<R: Filterable + Clone> Binding<R> {
    fn root(record: &R) -> Self { Self { entries: vec![(PathExpr::root(), record.clone())] } }

    fn get(&self, path: &PathExpr) -> Option<&R> { self.entries.iter().find(|(p, _)| p == path).map(|(_, r)| r) }

    fn extend(&self, path: &PathExpr, record: R) -> Self {
        let mut entries = self.entries.clone();
        entries.push((path.clone(), record));
        Self { entries }
    }
}

fn expand_joins<R: Filterable + Clone>(record: &R, joins: &[Join]) -> Result<Vec<Binding<R>>, EvaluationError> {
    let mut bindings = vec![Binding::root(record)];
    for join in joins {
        let mut next = Vec::new();
        for binding in &bindings {
            let parent_path = join.path.parent();
            let parent = binding.get(&parent_path).ok_or_else(|| EvaluationError::UnboundPath(join.path.clone()))?;
            let related =
                parent.related(join.path.property()).ok_or_else(|| EvaluationError::RelationNotFound(join.path.to_string()))?;
            for child in related {
                next.push(binding.extend(&join.path, child));
            }
        }
        bindings = next;
    }
    Ok(bindings)
}

fn evaluate_expr<R: Filterable + Clone>(binding: &Binding<R>, expr: &Expr) -> Result<Literal, EvaluationError> {
    match expr {
        Expr::Literal(lit) => Ok(lit.clone()),
        Expr::Path(path) => {
            let owner = binding.get(&path.parent()).ok_or_else(|| EvaluationError::UnboundPath(path.clone()))?;
            Ok(owner.value(path.property()).unwrap_or(Literal::Null))
        }
        Expr::Upper(inner) => match evaluate_expr(binding, inner)? {
            Literal::String(s) | Literal::Enum(s) => Ok(Literal::String(s.to_uppercase())),
            Literal::Char(c) => Ok(Literal::String(c.to_uppercase().collect())),
            Literal::Null => Ok(Literal::Null),
            other => Err(EvaluationError::InvalidFunctionArgument { function: "UPPER", value: other.to_string() }),
        },
        Expr::TimeOfDay(inner) => match evaluate_expr(binding, inner)? {
            Literal::DateTime(dt) => Ok(Literal::Time(dt.time())),
            Literal::Instant(i) => Ok(Literal::Time(i.time())),
            Literal::OffsetDateTime(o) => Ok(Literal::Time(o.with_timezone(&Utc).time())),
            Literal::Date(_) => Ok(Literal::Time(NaiveTime::MIN)),
            Literal::Time(t) => Ok(Literal::Time(t)),
            Literal::Null => Ok(Literal::Null),
            other => Err(EvaluationError::InvalidFunctionArgument { function: "TIME", value: other.to_string() }),
        },
        Expr::List(_) => Err(EvaluationError::InvalidExpression("a list is only valid on the right side of IN")),
    }
}

fn collate(left: &Literal, right: &Literal) -> Result<Ordering, EvaluationError> {
    left.collate(right).ok_or_else(|| EvaluationError::TypeMismatch { left: left.to_string(), right: right.to_string() })
}

fn text_of(value: &Literal) -> Option<String> {
    match value {
        Literal::String(s) | Literal::Enum(s) => Some(s.clone()),
        Literal::Char(c) => Some(c.to_string()),
        _ => None,
    }
}

/// SQL `LIKE`: `%` matches any run of characters, `_` exactly one.
pub fn like_matches(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    // matched[j] is true when value[..i] matches pattern[..j]
    let mut matched = vec![false; pattern.len() + 1];
    matched[0] = true;
    for j in 1..=pattern.len() {
        matched[j] = matched[j - 1] && pattern[j - 1] == '%';
    }
    for c in &value {
        let mut next = vec![false; pattern.len() + 1];
        for j in 1..=pattern.len() {
            next[j] = match pattern[j - 1] {
                '%' => next[j - 1] || matched[j],
                '_' => matched[j - 1],
                p => matched[j - 1] && p == *c,
            };
        }
        matched = next;
    }
    matched[pattern.len()]
}

/// Evaluate under three-valued logic. `None` is SQL *unknown*.
fn evaluate<R: Filterable + Clone>(binding: &Binding<R>, predicate: &Predicate) -> Result<Option<bool>, EvaluationError> {
    match predicate {
        Predicate::Comparison { left, operator: ComparisonOperator::In, right } => {
            let value = evaluate_expr(binding, left)?;
            let Expr::List(candidates) = right.as_ref() else {
                return Err(EvaluationError::InvalidExpression("IN requires a list"));
            };
            if value.is_null() {
                return Ok(None);
            }
            let mut unknown = false;
            for candidate in candidates {
                let candidate = evaluate_expr(binding, candidate)?;
                if candidate.is_null() {
                    unknown = true;
                } else if collate(&value, &candidate)? == Ordering::Equal {
                    return Ok(Some(true));
                }
            }
            Ok(if unknown { None } else { Some(false) })
        }
        Predicate::Comparison { left, operator, right } => {
            let left = evaluate_expr(binding, left)?;
            let right = evaluate_expr(binding, right)?;
            if left.is_null() || right.is_null() {
                return Ok(None);
            }
            let ordering = collate(&left, &right)?;
            Ok(Some(match operator {
                ComparisonOperator::Equal => ordering == Ordering::Equal,
                ComparisonOperator::NotEqual => ordering != Ordering::Equal,
                ComparisonOperator::GreaterThan => ordering == Ordering::Greater,
                ComparisonOperator::GreaterThanOrEqual => ordering != Ordering::Less,
                ComparisonOperator::LessThan => ordering == Ordering::Less,
                ComparisonOperator::LessThanOrEqual => ordering != Ordering::Greater,
                ComparisonOperator::In => unreachable!("handled above"),
            }))
        }
        Predicate::Like { expr, pattern } => {
            let value = evaluate_expr(binding, expr)?;
            if value.is_null() {
                return Ok(None);
            }
            let text = text_of(&value)
                .ok_or_else(|| EvaluationError::InvalidFunctionArgument { function: "LIKE", value: value.to_string() })?;
            Ok(Some(like_matches(&text, pattern)))
        }
        Predicate::Between { expr, low, high } => {
            let value = evaluate_expr(binding, expr)?;
            let low = evaluate_expr(binding, low)?;
            let high = evaluate_expr(binding, high)?;
            if value.is_null() || low.is_null() || high.is_null() {
                return Ok(None);
            }
            match value.is_in_range(RangeBound::Included(&low), RangeBound::Included(&high)) {
                Some(inside) => Ok(Some(inside)),
                None => Err(EvaluationError::TypeMismatch { left: value.to_string(), right: format!("{} AND {}", low, high) }),
            }
        }
        Predicate::IsNull(expr) => Ok(Some(evaluate_expr(binding, expr)?.is_null())),
        Predicate::And(left, right) => match evaluate(binding, left)? {
            Some(false) => Ok(Some(false)),
            l => match (l, evaluate(binding, right)?) {
                (_, Some(false)) => Ok(Some(false)),
                (Some(true), Some(true)) => Ok(Some(true)),
                _ => Ok(None),
            },
        },
        Predicate::Or(left, right) => match evaluate(binding, left)? {
            Some(true) => Ok(Some(true)),
            l => match (l, evaluate(binding, right)?) {
                (_, Some(true)) => Ok(Some(true)),
                (Some(false), Some(false)) => Ok(Some(false)),
                _ => Ok(None),
            },
        },
        Predicate::Not(inner) => Ok(evaluate(binding, inner)?.map(|b| !b)),
        Predicate::True => Ok(Some(true)),
        Predicate::False => Ok(Some(false)),
    }
}

/// Evaluate a predicate that references no joined relations.
pub fn evaluate_predicate<R: Filterable + Clone>(record: &R, predicate: &Predicate) -> Result<bool, EvaluationError> {
    evaluate_with_joins(record, predicate, &[])
}

/// Evaluate a predicate whose paths may reach through the given joins.
pub fn evaluate_with_joins<R: Filterable + Clone>(record: &R, predicate: &Predicate, joins: &[Join]) -> Result<bool, EvaluationError> {
    for binding in expand_joins(record, joins)? {
        if evaluate(&binding, predicate)? == Some(true) {
            return Ok(true);
        }
    }
    Ok(false)
}

#[derive(Debug, PartialEq)]
pub enum FilterResult<R> {
    Pass(R),
    Skip(R),
    Error(R, EvaluationError),
}

pub struct FilterIterator<I> {
    iter: I,
    predicate: Predicate,
    joins: Vec<Join>,
}

impl<I, R> FilterIterator<I>
where
    I: Iterator<Item = R>,
    R: Filterable + Clone,
{
    pub fn new(iter: I, predicate: Predicate, joins: Vec<Join>) -> Self { Self { iter, predicate, joins } }
}

impl<I, R> Iterator for FilterIterator<I>
where
    I: Iterator<Item = R>,
    R: Filterable + Clone,
{
    type Item = FilterResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|record| match evaluate_with_joins(&record, &self.predicate, &self.joins) {
            Ok(true) => FilterResult::Pass(record),
            Ok(false) => FilterResult::Skip(record),
            Err(e) => FilterResult::Error(record, e),
        })
    }
}
