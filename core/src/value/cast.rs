use super::date::{self, LocalZone};
use super::{ScalarKind, ScalarType};
use num_bigint::BigInt;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sieveql::ast::Literal;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CastError {
    /// Invalid format for the target type
    #[error("invalid format {value:?} for type {target}")]
    InvalidFormat { value: String, target: ScalarType },
    /// Value does not fit in the target type
    #[error("numeric overflow: {value:?} cannot fit in {target}")]
    NumericOverflow { value: String, target: ScalarType },
    /// Matches none of the recognized date/time formats
    #[error("unrecognized date format {0:?}")]
    UnidentifiedDate(String),
    #[error("empty value cannot be cast to {0}")]
    Empty(ScalarType),
    /// Lists and maps have no scalar form
    #[error("{value} is not a scalar value for type {target}")]
    NotScalar { value: String, target: ScalarType },
}

/// What a caster is converting to, and the zone for zone-less temporal input.
pub struct CastContext<'a> {
    pub target: ScalarType,
    pub zone: &'a LocalZone,
}

impl CastContext<'_> {
    fn invalid(&self, value: &str) -> CastError { CastError::InvalidFormat { value: value.to_string(), target: self.target } }
}

/// Converts the text form of an input into a typed literal. `Ok(None)` means "not found".
pub type Caster = fn(&str, &CastContext<'_>) -> Result<Option<Literal>, CastError>;

/// Per-type string to literal converters.
#[derive(Clone)]
pub struct CasterRegistry {
    casters: HashMap<ScalarKind, Caster>,
}

/// Casters for every built-in scalar type, constructed on first use.
pub static DEFAULT_CASTERS: Lazy<CasterRegistry> = Lazy::new(CasterRegistry::with_defaults);

impl Default for CasterRegistry {
    fn default() -> Self { Self::with_defaults() }
}

impl CasterRegistry {
    pub fn empty() -> Self { Self { casters: HashMap::new() } }

    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry
            .register(ScalarKind::String, cast_string)
            .register(ScalarKind::Char, cast_char)
            .register(ScalarKind::I8, cast_i8)
            .register(ScalarKind::I16, cast_i16)
            .register(ScalarKind::I32, cast_i32)
            .register(ScalarKind::I64, cast_i64)
            .register(ScalarKind::BigInt, cast_big_int)
            .register(ScalarKind::Decimal, cast_decimal)
            .register(ScalarKind::F32, cast_f32)
            .register(ScalarKind::F64, cast_f64)
            .register(ScalarKind::Bool, cast_bool)
            .register(ScalarKind::Uuid, cast_uuid)
            .register(ScalarKind::Date, cast_date)
            .register(ScalarKind::Time, cast_time)
            .register(ScalarKind::DateTime, cast_date_time)
            .register(ScalarKind::Instant, cast_instant)
            .register(ScalarKind::OffsetDateTime, cast_offset_date_time)
            .register(ScalarKind::Enum, cast_enum);
        registry
    }

    /// Register (or replace) the caster for a type
    pub fn register(&mut self, kind: ScalarKind, caster: Caster) -> &mut Self {
        self.casters.insert(kind, caster);
        self
    }

    pub fn is_registered(&self, kind: ScalarKind) -> bool { self.casters.contains_key(&kind) }

    /// Cast the text form of a value. A type without a caster passes the text through unchanged.
    pub fn cast(&self, target: ScalarType, raw: &str, zone: &LocalZone) -> Result<Option<Literal>, CastError> {
        match self.casters.get(&target.kind()) {
            Some(caster) => caster(raw, &CastContext { target, zone }),
            None => {
                warn!("no caster registered for type {target}, passing {raw:?} through unchanged");
                Ok(Some(Literal::String(raw.to_string())))
            }
        }
    }

    /// Cast a JSON scalar. `null` and "not found" both yield [`Literal::Null`].
    pub fn cast_value(&self, target: ScalarType, value: &JsonValue, zone: &LocalZone) -> Result<Literal, CastError> {
        let raw = match value {
            JsonValue::Null => return Ok(Literal::Null),
            JsonValue::String(s) => s.clone(),
            JsonValue::Number(n) => n.to_string(),
            JsonValue::Bool(b) => b.to_string(),
            JsonValue::Array(_) | JsonValue::Object(_) => return Err(CastError::NotScalar { value: value.to_string(), target }),
        };
        Ok(self.cast(target, &raw, zone)?.unwrap_or(Literal::Null))
    }

    /// Cast every item, flattening nested lists into one candidate list.
    ///
    /// Integer numbers headed for a 64-bit field are taken as they are rather than through their text form.
    pub fn cast_list(&self, target: ScalarType, values: &[JsonValue], zone: &LocalZone) -> Result<Vec<Literal>, CastError> {
        let mut literals = Vec::with_capacity(values.len());
        for value in values {
            match value {
                JsonValue::Array(nested) => literals.extend(self.cast_list(target, nested, zone)?),
                JsonValue::Number(n) if target == ScalarType::I64 && n.is_i64() => {
                    literals.push(n.as_i64().map(Literal::I64).unwrap_or(Literal::Null));
                }
                other => literals.push(self.cast_value(target, other, zone)?),
            }
        }
        Ok(literals)
    }
}

fn cast_string(raw: &str, _: &CastContext<'_>) -> Result<Option<Literal>, CastError> { Ok(Some(Literal::String(raw.to_string()))) }

fn cast_char(raw: &str, ctx: &CastContext<'_>) -> Result<Option<Literal>, CastError> {
    raw.chars().next().map(|c| Some(Literal::Char(c))).ok_or(CastError::Empty(ctx.target))
}

/// Parse an integer that must fit the target exactly.
fn parse_bounded<T: TryFrom<i64>>(raw: &str, ctx: &CastContext<'_>) -> Result<T, CastError> {
    let wide = raw.trim().parse::<i64>().map_err(|_| ctx.invalid(raw))?;
    T::try_from(wide).map_err(|_| CastError::NumericOverflow { value: raw.to_string(), target: ctx.target })
}

fn cast_i8(raw: &str, ctx: &CastContext<'_>) -> Result<Option<Literal>, CastError> { Ok(Some(Literal::I8(parse_bounded(raw, ctx)?))) }

fn cast_i16(raw: &str, ctx: &CastContext<'_>) -> Result<Option<Literal>, CastError> { Ok(Some(Literal::I16(parse_bounded(raw, ctx)?))) }

fn cast_i32(raw: &str, ctx: &CastContext<'_>) -> Result<Option<Literal>, CastError> {
    let wide = raw.trim().parse::<i64>().map_err(|_| ctx.invalid(raw))?;
    Ok(Some(Literal::I32(wide.clamp(i32::MIN as i64, i32::MAX as i64) as i32)))
}

fn cast_i64(raw: &str, ctx: &CastContext<'_>) -> Result<Option<Literal>, CastError> {
    raw.trim().parse::<i64>().map(|i| Some(Literal::I64(i))).map_err(|_| ctx.invalid(raw))
}

fn cast_big_int(raw: &str, ctx: &CastContext<'_>) -> Result<Option<Literal>, CastError> {
    BigInt::from_str(raw.trim()).map(|b| Some(Literal::BigInt(b))).map_err(|_| ctx.invalid(raw))
}

fn cast_decimal(raw: &str, ctx: &CastContext<'_>) -> Result<Option<Literal>, CastError> {
    let raw_trimmed = raw.trim();
    Decimal::from_str(raw_trimmed)
        .or_else(|_| Decimal::from_scientific(raw_trimmed))
        .map(|d| Some(Literal::Decimal(d)))
        .map_err(|_| ctx.invalid(raw))
}

fn cast_f32(raw: &str, ctx: &CastContext<'_>) -> Result<Option<Literal>, CastError> {
    raw.trim().parse::<f32>().map(|f| Some(Literal::F32(f))).map_err(|_| ctx.invalid(raw))
}

fn cast_f64(raw: &str, ctx: &CastContext<'_>) -> Result<Option<Literal>, CastError> {
    raw.trim().parse::<f64>().map(|f| Some(Literal::F64(f))).map_err(|_| ctx.invalid(raw))
}

/// Only a case-insensitive `true` is true; everything else is false.
fn cast_bool(raw: &str, _: &CastContext<'_>) -> Result<Option<Literal>, CastError> { Ok(Some(Literal::Bool(raw.trim().eq_ignore_ascii_case("true")))) }

fn cast_uuid(raw: &str, ctx: &CastContext<'_>) -> Result<Option<Literal>, CastError> {
    Uuid::parse_str(raw.trim()).map(|u| Some(Literal::Uuid(u))).map_err(|_| ctx.invalid(raw))
}

fn cast_date(raw: &str, ctx: &CastContext<'_>) -> Result<Option<Literal>, CastError> { Ok(Some(Literal::Date(date::to_date(raw, ctx.zone)?))) }

fn cast_time(raw: &str, _: &CastContext<'_>) -> Result<Option<Literal>, CastError> { Ok(Some(Literal::Time(date::to_time(raw)?))) }

fn cast_date_time(raw: &str, ctx: &CastContext<'_>) -> Result<Option<Literal>, CastError> {
    Ok(Some(Literal::DateTime(date::to_date_time(raw, ctx.zone)?)))
}

fn cast_instant(raw: &str, ctx: &CastContext<'_>) -> Result<Option<Literal>, CastError> { Ok(Some(Literal::Instant(date::to_instant(raw, ctx.zone)?))) }

fn cast_offset_date_time(raw: &str, _: &CastContext<'_>) -> Result<Option<Literal>, CastError> {
    Ok(Some(Literal::OffsetDateTime(date::to_offset_date_time(raw)?)))
}

fn cast_enum(raw: &str, ctx: &CastContext<'_>) -> Result<Option<Literal>, CastError> {
    let ScalarType::Enum(enum_type) = ctx.target else {
        return Err(ctx.invalid(raw));
    };
    match enum_type.member(raw.trim()) {
        Some(member) => Ok(Some(Literal::Enum(member.to_string()))),
        None => {
            warn!("{raw:?} is not a member of enum {}", enum_type.name);
            Ok(None)
        }
    }
}
