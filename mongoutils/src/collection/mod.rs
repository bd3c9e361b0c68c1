//! Typed collections and the builder that ensures them.
//!
//! A [`Collection<T>`] wraps a driver collection of raw documents and
//! exposes typed CRUD operations for a [`Schema`](crate::schema::Schema)
//! type `T`. Filters are checked against the schema before they reach the
//! server.

mod collection;
mod collection_builder;
mod find_options;

pub use collection::*;
pub use collection_builder::*;
pub use find_options::*;
