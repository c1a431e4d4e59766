use crate::error::ConfigError;
use crate::value::LocalZone;
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_PAGE_KEY: &str = "_page";
pub const DEFAULT_SORT_KEY: &str = "sort";
pub const DEFAULT_LIMIT: u64 = 10_000;
pub const MAX_LIMIT: u64 = 10_000_000;

pub const ENV_DEFAULT_LIMIT: &str = "SIEVE_DEFAULT_LIMIT";
pub const ENV_MAX_LIMIT: &str = "SIEVE_MAX_LIMIT";
pub const ENV_PAGE_KEY: &str = "SIEVE_PAGE_KEY";
pub const ENV_TIME_ZONE: &str = "SIEVE_TIME_ZONE";

/// Filter and pagination settings. Every field has a default, so a partial document deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Reserved filter key carrying `{limit, offset, sort}`
    pub page_key: String,
    /// Top-level sort key honored when the page key is absent
    pub sort_key: String,
    pub default_limit: u64,
    /// Larger limits are clamped to this
    pub max_limit: u64,
    /// IANA zone for zone-less temporal input. The system zone when unset.
    pub time_zone: Option<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            page_key: DEFAULT_PAGE_KEY.to_string(),
            sort_key: DEFAULT_SORT_KEY.to_string(),
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            time_zone: None,
        }
    }
}

impl FilterConfig {
    /// Defaults overlaid with `SIEVE_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(value) = env::var(ENV_DEFAULT_LIMIT) {
            config.default_limit = parse_limit(ENV_DEFAULT_LIMIT, &value)?;
        }
        if let Ok(value) = env::var(ENV_MAX_LIMIT) {
            config.max_limit = parse_limit(ENV_MAX_LIMIT, &value)?;
        }
        if let Ok(value) = env::var(ENV_PAGE_KEY) {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue { key: ENV_PAGE_KEY, value });
            }
            config.page_key = value.trim().to_string();
        }
        if let Ok(value) = env::var(ENV_TIME_ZONE) {
            config.time_zone = Some(value.trim().to_string()).filter(|z| !z.is_empty());
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_time_zone(mut self, zone: impl Into<String>) -> Self {
        self.time_zone = Some(zone.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_limit == 0 {
            return Err(ConfigError::InvalidValue { key: "default_limit", value: self.default_limit.to_string() });
        }
        if self.max_limit < self.default_limit {
            return Err(ConfigError::InvalidValue { key: "max_limit", value: self.max_limit.to_string() });
        }
        self.zone().map(|_| ())
    }

    /// Resolved zone for zone-less temporal input
    pub fn zone(&self) -> Result<LocalZone, ConfigError> {
        match &self.time_zone {
            None => Ok(LocalZone::System),
            Some(name) => LocalZone::named(name).ok_or_else(|| ConfigError::UnknownTimeZone(name.clone())),
        }
    }
}

fn parse_limit(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().ok().filter(|l| *l > 0).ok_or_else(|| ConfigError::InvalidValue { key, value: value.to_string() })
}
