//! In-memory rows and an [`Executor`](sieve_core::Executor) that runs selections over them.
//!
//! Joins are expanded record by record, predicates evaluate through `sieveql`'s in-memory sink, and
//! sorting, offset and limit are applied afterwards.

mod record;
mod rows;
mod store;

pub use record::{Links, Record};
pub use rows::{RowRef, RowStream};
pub use store::{MemoryError, MemoryStore};
