use crate::ast::{Expr, Literal, PathExpr};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use uuid::Uuid;

macro_rules! literal_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Literal {
                fn from(value: $ty) -> Self { Literal::$variant(value) }
            }
        )*
    };
}

literal_from! {
    String => String,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    BigInt => BigInt,
    Decimal => Decimal,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    DateTime<Utc> => Instant,
    DateTime<FixedOffset> => OffsetDateTime,
}

impl<'a> From<&'a str> for Literal {
    fn from(value: &'a str) -> Self { Literal::String(value.to_string()) }
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(value: Option<T>) -> Self { value.map(Into::into).unwrap_or(Literal::Null) }
}

impl From<Literal> for Expr {
    fn from(value: Literal) -> Self { Expr::Literal(value) }
}

impl From<PathExpr> for Expr {
    fn from(value: PathExpr) -> Self { Expr::Path(value) }
}

/// Parses a dotted path such as `author.name`.
impl<'a> From<&'a str> for PathExpr {
    fn from(value: &'a str) -> Self { PathExpr { steps: value.split('.').filter(|s| !s.is_empty()).map(str::to_string).collect() } }
}
