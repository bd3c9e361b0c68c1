//! Declared document shapes.
//!
//! A collection is bound to one [`Schema`] type. The type decides how documents
//! are encoded and decoded, and its serialized keys form a [`SchemaShape`]
//! that filters are checked against before they reach the driver.
//!
//! ```rust,ignore
//! use mongodb::bson::oid::ObjectId;
//! use mongoutils_derive::Schema;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize, Schema)]
//! #[schema(name = "words", index(name = "word_index", fields = "word:desc", unique))]
//! pub struct Item {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<ObjectId>,
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     pub word: Option<String>,
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     pub hits: Option<i32>,
//! }
//! ```

mod schema;
mod shape;

pub use schema::*;
pub use shape::*;
