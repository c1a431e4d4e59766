use crate::ast::Literal;
use chrono::{DateTime, NaiveTime, Utc};
use num_bigint::BigInt;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::str::FromStr;

/// Represents a bound in a range query
#[derive(Debug, Clone, PartialEq)]
pub enum RangeBound<T> {
    Included(T),
    Excluded(T),
    Unbounded,
}

/// Trait for types that support collation operations
pub trait Collation {
    /// Compare two values in the collation order.
    ///
    /// Returns `None` when the values have no defined order, either because one side is NULL
    /// or because the types cannot be compared with each other.
    fn collate(&self, other: &Self) -> Option<Ordering>;

    /// Returns whether this value is within the given range, or `None` if any comparison is undefined
    fn is_in_range(&self, lower: RangeBound<&Self>, upper: RangeBound<&Self>) -> Option<bool> {
        let above = match lower {
            RangeBound::Unbounded => true,
            RangeBound::Included(lower) => self.collate(lower)? != Ordering::Less,
            RangeBound::Excluded(lower) => self.collate(lower)? == Ordering::Greater,
        };
        let below = match upper {
            RangeBound::Unbounded => true,
            RangeBound::Included(upper) => self.collate(upper)? != Ordering::Greater,
            RangeBound::Excluded(upper) => self.collate(upper)? == Ordering::Less,
        };
        Some(above && below)
    }
}

enum Numeric<'a> {
    Int(i64),
    Big(&'a BigInt),
    Dec(Decimal),
    Float(f64),
}

impl Numeric<'_> {
    fn of(literal: &Literal) -> Option<Numeric<'_>> {
        Some(match literal {
            Literal::I8(i) => Numeric::Int(*i as i64),
            Literal::I16(i) => Numeric::Int(*i as i64),
            Literal::I32(i) => Numeric::Int(*i as i64),
            Literal::I64(i) => Numeric::Int(*i),
            Literal::BigInt(b) => Numeric::Big(b),
            Literal::Decimal(d) => Numeric::Dec(*d),
            Literal::F32(f) => Numeric::Float(*f as f64),
            Literal::F64(f) => Numeric::Float(*f),
            _ => return None,
        })
    }

    fn to_f64(&self) -> Option<f64> {
        match self {
            Numeric::Int(i) => Some(*i as f64),
            Numeric::Big(b) => b.to_f64(),
            Numeric::Dec(d) => d.to_f64(),
            Numeric::Float(f) => Some(*f),
        }
    }

    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Numeric::Int(i) => Some(Decimal::from(*i)),
            Numeric::Big(b) => Decimal::from_str(&b.to_string()).ok(),
            Numeric::Dec(d) => Some(*d),
            Numeric::Float(f) => Decimal::from_f64(*f),
        }
    }

    fn compare(&self, other: &Numeric) -> Option<Ordering> {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => Some(a.cmp(b)),
            (Numeric::Float(_), _) | (_, Numeric::Float(_)) => self.to_f64()?.partial_cmp(&other.to_f64()?),
            (Numeric::Big(a), Numeric::Big(b)) => Some(a.cmp(b)),
            (Numeric::Big(a), Numeric::Int(b)) => Some((*a).cmp(&BigInt::from(*b))),
            (Numeric::Int(a), Numeric::Big(b)) => Some(BigInt::from(*a).cmp(b)),
            // A decimal against a BigInt too large for a decimal still orders by magnitude
            _ => match (self.to_decimal(), other.to_decimal()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => self.to_f64()?.partial_cmp(&other.to_f64()?),
            },
        }
    }
}

fn text(literal: &Literal) -> Option<std::borrow::Cow<'_, str>> {
    match literal {
        Literal::String(s) => Some(s.as_str().into()),
        Literal::Enum(s) => Some(s.as_str().into()),
        Literal::Char(c) => Some(c.to_string().into()),
        _ => None,
    }
}

fn instant(literal: &Literal) -> Option<DateTime<Utc>> {
    match literal {
        Literal::Instant(i) => Some(*i),
        Literal::OffsetDateTime(o) => Some(o.with_timezone(&Utc)),
        _ => None,
    }
}

impl Collation for Literal {
    fn collate(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Literal::Null, _) | (_, Literal::Null) => None,
            (Literal::Bool(a), Literal::Bool(b)) => Some(a.cmp(b)),
            (Literal::Uuid(a), Literal::Uuid(b)) => Some(a.cmp(b)),
            (Literal::Date(a), Literal::Date(b)) => Some(a.cmp(b)),
            (Literal::Time(a), Literal::Time(b)) => Some(a.cmp(b)),
            (Literal::DateTime(a), Literal::DateTime(b)) => Some(a.cmp(b)),
            (Literal::Date(a), Literal::DateTime(b)) => Some(a.and_time(NaiveTime::MIN).cmp(b)),
            (Literal::DateTime(a), Literal::Date(b)) => Some(a.cmp(&b.and_time(NaiveTime::MIN))),
            _ => {
                if let (Some(a), Some(b)) = (Numeric::of(self), Numeric::of(other)) {
                    return a.compare(&b);
                }
                if let (Some(a), Some(b)) = (text(self), text(other)) {
                    return Some(a.cmp(&b));
                }
                if let (Some(a), Some(b)) = (instant(self), instant(other)) {
                    return Some(a.cmp(&b));
                }
                None
            }
        }
    }
}

/// Total order used for sorting: NULL sorts after every other value, incomparable values keep their relative order.
pub fn sort_order(a: &Literal, b: &Literal) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.collate(b).unwrap_or(Ordering::Equal),
    }
}
