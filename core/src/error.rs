//! Public error types for sieve.
//!
//! [`FilterError`] covers everything that can go wrong while turning a filter map into a selection.
//! [`RetrievalError`] is what the service returns once an executor is involved.

use crate::filter::Operator;
use crate::value::CastError;
use thiserror::Error;

/// Failure while building, compiling or paging a filter
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    /// Every field of one filter pass that the entity does not declare
    #[error("unknown fields for {entity}: {}", .fields.join(", "))]
    UnknownFields { entity: String, fields: Vec<String> },

    /// Operator cannot be applied to the field's type
    #[error("can't perform a {operator} operation with a {scalar} for field {field}")]
    UnsupportedOperation { operator: Operator, scalar: String, field: String },

    /// A range record whose `from` and `to` are both null
    #[error("empty range for field {field}")]
    EmptyRange { field: String },

    #[error("unknown control flag {flag:?}")]
    UnknownControlFlag { flag: String },

    #[error("unparseable value: {0}")]
    UnparseableValue(#[from] CastError),

    #[error("wrong sorting parameter {token:?}: {reason}")]
    InvalidSortToken { token: String, reason: &'static str },

    #[error("invalid page parameter {name}: {reason}")]
    InvalidPageParameter { name: &'static str, reason: String },
}

/// Failure to load configuration
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("unknown time zone {0:?}")]
    UnknownTimeZone(String),
}

/// Error type for retrieval operations.
///
/// Returned from: `FilterService::filter`, `page_filter`, `page_filter_with`
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The filter map could not be compiled
    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),

    /// No schema is registered for the entity
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// The executor failed
    #[error("storage error: {0}")]
    StorageError(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl RetrievalError {
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self { RetrievalError::StorageError(Box::new(err)) }
}
