//! Index definitions and their validation against a schema.
//!
//! Indexes are declared as [`IndexConfig`] values, either on the collection
//! builder or on the schema type with `#[schema(index(...))]`, and are built
//! one at a time when the collection is ensured.

mod index_config;

pub use index_config::*;
