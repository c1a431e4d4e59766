//! Typed predicate trees produced by dynamic filters, and the sinks that execute them.
//!
//! A [`ast::Selection`] is what the filter compiler emits: a boolean [`ast::Predicate`] over property
//! paths, the joins those paths reach through, and optional ordering and paging. Two sinks consume it:
//! [`selection::filter`] evaluates it against in-memory records and [`selection::sql`] renders it as
//! parameterised SQL.

pub mod ast;
pub mod collation;
pub mod conversion;
pub mod error;
pub mod selection;
