//! # Sieve
//!
//! Sieve turns an untyped, nested filter map (typically JSON from a request) into a typed predicate
//! over an entity model, plus a pagination and sort request.
//!
//! ## Key Features
//!
//! - **Operator inference**: the shape of each value picks the operator (`null`, scalar, `%like%`,
//!   list, `{from, to}` range, nested relation filter)
//! - **Schema-driven casting**: values are cast to each field's declared type, with date formats
//!   detected automatically
//! - **Relations**: nested maps become inner joins onto related entities, to any depth
//! - **Batched validation**: every unknown field of a request is reported in one error
//! - **Two sinks**: evaluate in memory, or render parameterised SQL
//!
//! ## Example
//!
//! ```rust
//! use sieve::prelude::*;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::new().with(
//!     EntityDescriptor::builder("Book").identity("id").scalar("id", ScalarType::I64).scalar("title", ScalarType::String).build(),
//! );
//! let store = MemoryStore::new();
//! store.insert("Book", Record::new("id", 1i64).set("title", "Dune"))?;
//! store.insert("Book", Record::new("id", 2i64).set("title", "Emma"))?;
//!
//! let service = FilterService::new(catalog, store);
//! let filter = json!({"title": "dune", "_page": {"limit": 10}});
//! let page = service.page_filter("Book", filter.as_object().unwrap())?;
//! assert_eq!(page.total_rows, 1);
//! assert_eq!(page.items[0].get("title"), Some(&Literal::from("Dune")));
//! # Ok(())
//! # }
//! ```

pub use sieve_core as core;
#[cfg(feature = "memory")]
pub use sieve_storage_memory as memory;
pub use sieveql;

pub use sieve_core::{error, filter, pagination, schema, value};

pub mod prelude {
    pub use sieve_core::filter::{FilterMap, FilterTreeBuilder};
    pub use sieve_core::schema::{Catalog, EntityDescriptor, FieldSchema, SchemaProvider, SchemaRegistry};
    pub use sieve_core::value::{EnumType, LocalZone, ScalarType};
    pub use sieve_core::{
        CompiledFilter, ConfigError, Executor, ExtraCriteria, FilterConfig, FilterError, FilterService, PageResult, PageSpec, PredicateCompiler,
        RetrievalError,
    };
    #[cfg(feature = "memory")]
    pub use sieve_storage_memory::{MemoryStore, Record};
    pub use sieveql::ast::{FetchMode, Literal, Predicate, Selection};
}
