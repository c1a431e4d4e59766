//! Schema-driven filter compilation.
//!
//! An untyped filter map goes through [`filter::FilterTreeBuilder`] (operator inference against a
//! [`schema::FieldSchema`]), then [`compiler::PredicateCompiler`] (typed casting, joins), producing a
//! `sieveql` selection. [`service::FilterService`] wires the pipeline to an [`service::Executor`] and
//! wraps paged results.

pub mod compiler;
pub mod config;
pub mod error;
pub mod filter;
pub mod naming;
pub mod pagination;
pub mod schema;
pub mod service;
pub mod value;

pub use compiler::{CompiledFilter, PredicateCompiler};
pub use config::FilterConfig;
pub use error::{ConfigError, FilterError, RetrievalError};
pub use pagination::{PageResult, PageSpec, PaginationBuilder, SortToken};
pub use service::{Executor, ExtraCriteria, FilterService};

pub use sieveql;

#[cfg(test)]
#[ctor::ctor]
fn init_tracing() {
    use std::str::FromStr;
    // if LOG_LEVEL env var is set, use it
    let level = std::env::var("LOG_LEVEL").ok().and_then(|l| tracing::Level::from_str(&l).ok()).unwrap_or(tracing::Level::INFO);
    let _ = tracing_subscriber::fmt().with_max_level(level).with_test_writer().try_init();
}
