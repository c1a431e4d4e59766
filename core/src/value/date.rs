//! Recognition of date/time strings and their conversion into typed temporal values.
//!
//! [`identify`] classifies a string by trying a fixed list of formats in order; the first that parses
//! wins. The `to_*` functions re-parse the string under that format and convert it into the requested
//! temporal type. Zone-less inputs that need an instant are placed in the configured [`LocalZone`].

use super::{CastError, ScalarType};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    IsoDate,
    /// `YYYY-MM-DDThh:mm:ss[.f]`
    IsoDateTime,
    /// `YYYY-MM-DDThh:mm:ssZ`
    IsoDateTimeUtc,
    /// `YYYY-MM-DDThh:mm:ss+hh:mm`, optionally followed by a bracketed zone id
    IsoDateTimeOffset,
    /// Integer of at most ten digits
    EpochSeconds,
    /// Integer of more than ten digits
    EpochMillis,
    /// `YYYY-MM-DD hh:mm:ss.s`
    SqlDateTime,
    /// `EEE, dd MMM yyyy HH:mm:ss zzz`
    Rfc1123,
    Unidentified,
}

static SQL_DATE_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d$").expect("static pattern"));

fn parse_iso_date(value: &str) -> Option<NaiveDate> { NaiveDate::parse_from_str(value, "%Y-%m-%d").ok() }

fn parse_iso_date_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")).ok()
}

fn parse_zoned(value: &str) -> Option<DateTime<FixedOffset>> {
    // A trailing region id such as `[Europe/Paris]` only names the zone; the offset before it is authoritative
    let value = match (value.find('['), value.ends_with(']')) {
        (Some(start), true) => &value[..start],
        _ => value,
    };
    DateTime::parse_from_rfc3339(value).or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z")).ok()
}

fn parse_epoch(value: &str) -> Option<i64> { value.parse::<i64>().ok() }

fn parse_sql_date_time(value: &str) -> Option<NaiveDateTime> { NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").ok() }

fn parse_rfc1123(value: &str) -> Option<DateTime<FixedOffset>> { DateTime::parse_from_rfc2822(value).ok() }

/// Classify a date/time string. Formats are tried in declaration order of [`DateFormat`].
pub fn identify(value: &str) -> DateFormat {
    if parse_iso_date(value).is_some() {
        return DateFormat::IsoDate;
    }
    if parse_iso_date_time(value).is_some() {
        return DateFormat::IsoDateTime;
    }
    if value.ends_with('Z') && parse_zoned(value).is_some() {
        return DateFormat::IsoDateTimeUtc;
    }
    if parse_zoned(value).is_some() {
        return DateFormat::IsoDateTimeOffset;
    }
    if let Some(epoch) = parse_epoch(value) {
        return if epoch.to_string().len() <= 10 { DateFormat::EpochSeconds } else { DateFormat::EpochMillis };
    }
    if SQL_DATE_TIME.is_match(value) {
        return DateFormat::SqlDateTime;
    }
    if parse_rfc1123(value).is_some() {
        return DateFormat::Rfc1123;
    }
    warn!("unrecognized date format: {value:?}");
    DateFormat::Unidentified
}

/// Zone used for inputs that carry no zone of their own.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum LocalZone {
    /// The zone of the host system
    #[default]
    System,
    Named(Tz),
}

impl LocalZone {
    /// Parse an IANA zone name such as `Europe/Lisbon`
    pub fn named(name: &str) -> Option<Self> { name.parse::<Tz>().ok().map(LocalZone::Named) }

    /// The instant at which the local wall clock shows `local`
    pub fn to_utc(&self, local: &NaiveDateTime) -> DateTime<Utc> {
        match self {
            LocalZone::System => resolve_local(&Local, local),
            LocalZone::Named(tz) => resolve_local(tz, local),
        }
    }

    /// The local wall clock at `instant`
    pub fn from_utc(&self, instant: &DateTime<Utc>) -> NaiveDateTime {
        match self {
            LocalZone::System => instant.with_timezone(&Local).naive_local(),
            LocalZone::Named(tz) => instant.with_timezone(tz).naive_local(),
        }
    }
}

fn resolve_local<Z: TimeZone>(zone: &Z, local: &NaiveDateTime) -> DateTime<Utc> {
    match zone.from_local_datetime(local).earliest() {
        Some(resolved) => resolved.with_timezone(&Utc),
        // Wall clock falls into a transition gap; shift by the offset in force at that moment
        None => {
            let offset = zone.offset_from_utc_datetime(local).fix();
            Utc.from_utc_datetime(&(*local - offset))
        }
    }
}

/// A string parsed under its identified format, before conversion to the target type.
enum Parsed {
    Date(NaiveDate),
    Local(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
    Epoch(DateTime<Utc>),
}

fn parse(value: &str, target: ScalarType) -> Result<Parsed, CastError> {
    let invalid = || CastError::InvalidFormat { value: value.to_string(), target };
    let format = identify(value);
    let parsed = match format {
        DateFormat::IsoDate => parse_iso_date(value).map(Parsed::Date),
        DateFormat::IsoDateTime => parse_iso_date_time(value).map(Parsed::Local),
        DateFormat::IsoDateTimeUtc | DateFormat::IsoDateTimeOffset => parse_zoned(value).map(Parsed::Zoned),
        DateFormat::EpochSeconds => parse_epoch(value).and_then(|s| DateTime::from_timestamp(s, 0)).map(Parsed::Epoch),
        DateFormat::EpochMillis => parse_epoch(value).and_then(DateTime::from_timestamp_millis).map(Parsed::Epoch),
        DateFormat::SqlDateTime => parse_sql_date_time(value).map(Parsed::Local),
        DateFormat::Rfc1123 => parse_rfc1123(value).map(Parsed::Zoned),
        DateFormat::Unidentified => return Err(CastError::UnidentifiedDate(value.to_string())),
    };
    parsed.ok_or_else(invalid)
}

/// Calendar date. Zoned inputs keep their wall-clock date, epochs are read in the local zone.
pub fn to_date(value: &str, zone: &LocalZone) -> Result<NaiveDate, CastError> {
    Ok(match parse(value, ScalarType::Date)? {
        Parsed::Date(date) => date,
        Parsed::Local(dt) => dt.date(),
        Parsed::Zoned(z) => z.date_naive(),
        Parsed::Epoch(e) => zone.from_utc(&e).date(),
    })
}

/// Local date-time. Dates start at midnight, zoned inputs keep their wall clock.
pub fn to_date_time(value: &str, zone: &LocalZone) -> Result<NaiveDateTime, CastError> {
    Ok(match parse(value, ScalarType::DateTime)? {
        Parsed::Date(date) => date.and_time(NaiveTime::MIN),
        Parsed::Local(dt) => dt,
        Parsed::Zoned(z) => z.naive_local(),
        Parsed::Epoch(e) => zone.from_utc(&e),
    })
}

/// Instant on the UTC time line. Zone-less inputs are placed in the local zone.
pub fn to_instant(value: &str, zone: &LocalZone) -> Result<DateTime<Utc>, CastError> {
    Ok(match parse(value, ScalarType::Instant)? {
        Parsed::Date(date) => zone.to_utc(&date.and_time(NaiveTime::MIN)),
        Parsed::Local(dt) => zone.to_utc(&dt),
        Parsed::Zoned(z) => z.with_timezone(&Utc),
        Parsed::Epoch(e) => e,
    })
}

/// Date-time with offset. Zone-less inputs and epochs are taken as UTC.
pub fn to_offset_date_time(value: &str) -> Result<DateTime<FixedOffset>, CastError> {
    Ok(match parse(value, ScalarType::OffsetDateTime)? {
        Parsed::Date(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)).fixed_offset(),
        Parsed::Local(dt) => Utc.from_utc_datetime(&dt).fixed_offset(),
        Parsed::Zoned(z) => z,
        Parsed::Epoch(e) => e.fixed_offset(),
    })
}

/// Time of day, `HH:MM:SS` with optional fraction.
pub fn to_time(value: &str) -> Result<NaiveTime, CastError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f").map_err(|_| CastError::InvalidFormat { value: value.to_string(), target: ScalarType::Time })
}
