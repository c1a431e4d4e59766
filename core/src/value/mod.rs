mod cast;
pub mod date;

pub use cast::{CastContext, CastError, Caster, CasterRegistry, DEFAULT_CASTERS};
pub use date::{identify, DateFormat, LocalZone};

use std::fmt;

/// Declared type of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Char,
    /// 8-bit integer (byte)
    I8,
    /// 16-bit integer (short)
    I16,
    /// 32-bit integer; out of range inputs clamp to the nearest bound
    I32,
    I64,
    BigInt,
    Decimal,
    F32,
    F64,
    Bool,
    Uuid,
    Date,
    /// Time of day, `HH:MM:SS`
    Time,
    /// Local date-time without a zone (timestamp)
    DateTime,
    /// Point on the UTC time line
    Instant,
    OffsetDateTime,
    Enum(EnumType),
    /// A type no caster is registered for. Values pass through as text.
    Other(&'static str),
}

/// Payload-free discriminant of a [`ScalarType`], used to key caster registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Char,
    I8,
    I16,
    I32,
    I64,
    BigInt,
    Decimal,
    F32,
    F64,
    Bool,
    Uuid,
    Date,
    Time,
    DateTime,
    Instant,
    OffsetDateTime,
    Enum,
    Other,
}

/// An enumerated type with a fixed set of member names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumType {
    pub name: &'static str,
    pub members: &'static [&'static str],
}

impl EnumType {
    pub const fn new(name: &'static str, members: &'static [&'static str]) -> Self { Self { name, members } }

    /// Case-insensitive member lookup
    pub fn member(&self, value: &str) -> Option<&'static str> { self.members.iter().copied().find(|m| m.eq_ignore_ascii_case(value)) }
}

impl ScalarType {
    pub fn kind(&self) -> ScalarKind {
        match self {
            ScalarType::String => ScalarKind::String,
            ScalarType::Char => ScalarKind::Char,
            ScalarType::I8 => ScalarKind::I8,
            ScalarType::I16 => ScalarKind::I16,
            ScalarType::I32 => ScalarKind::I32,
            ScalarType::I64 => ScalarKind::I64,
            ScalarType::BigInt => ScalarKind::BigInt,
            ScalarType::Decimal => ScalarKind::Decimal,
            ScalarType::F32 => ScalarKind::F32,
            ScalarType::F64 => ScalarKind::F64,
            ScalarType::Bool => ScalarKind::Bool,
            ScalarType::Uuid => ScalarKind::Uuid,
            ScalarType::Date => ScalarKind::Date,
            ScalarType::Time => ScalarKind::Time,
            ScalarType::DateTime => ScalarKind::DateTime,
            ScalarType::Instant => ScalarKind::Instant,
            ScalarType::OffsetDateTime => ScalarKind::OffsetDateTime,
            ScalarType::Enum(_) => ScalarKind::Enum,
            ScalarType::Other(_) => ScalarKind::Other,
        }
    }

    /// Text fields compare case-insensitively
    pub fn is_text(&self) -> bool { matches!(self, ScalarType::String | ScalarType::Char) }

    pub fn is_bool(&self) -> bool { matches!(self, ScalarType::Bool) }

    pub fn is_enum(&self) -> bool { matches!(self, ScalarType::Enum(_)) }

    /// Types whose values carry a time of day
    pub fn has_time_of_day(&self) -> bool {
        matches!(self, ScalarType::DateTime | ScalarType::Instant | ScalarType::OffsetDateTime | ScalarType::Time)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Enum(e) => write!(f, "enum {}", e.name),
            ScalarType::Other(name) => f.write_str(name),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}
