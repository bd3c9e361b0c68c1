//! # mongoutils - Typed collections for MongoDB
//!
//! mongoutils is a thin convenience layer over the official MongoDB driver.
//! Each collection is bound to a Rust type describing its documents, and every
//! filter is checked against that type before it is sent to the server.
//!
//! ## Key Features
//!
//! - **Schema checks**: filters with unknown fields are rejected locally
//!   instead of silently matching nothing
//! - **Typed CRUD**: insert, find, count, update, delete and aggregate with
//!   results decoded into your types
//! - **Index management**: indexes declared on the type or the builder are
//!   validated against the schema and created when the collection is ensured
//! - **Timeouts**: every round trip runs under a per-connection deadline
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mongodb::bson::{doc, oid::ObjectId};
//! use mongoutils::client::{Client, ClientConfig, Connection};
//! use mongoutils::collection::{Collection, FindOptions};
//! use mongoutils_derive::Schema;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Schema)]
//! #[schema(index(fields = "word:desc", unique))]
//! struct Item {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     id: Option<ObjectId>,
//!     word: String,
//!     definition: String,
//! }
//!
//! let config = ClientConfig::builder().hosts_str("localhost:27017").build()?;
//! let client = Client::connect(config).await?;
//! let connection = Connection::new(client, 3000)?;
//!
//! let items = Collection::<Item>::builder(connection)
//!     .database("dictionary")
//!     .ensure()
//!     .await?;
//!
//! let found = items.find(&doc! { "word": "apple" }, FindOptions::new()).await?;
//! ```
//!
//! ## Module Organization
//!
//! - [`client`] - Client configuration, connecting and resource timeouts
//! - [`collection`] - Typed collections, the ensuring builder and find options
//! - [`common`] - Constants, document encoding and timeout helpers
//! - [`errors`] - Error types and result definitions
//! - [`index`] - Index definitions and their validation
//! - [`schema`] - The `Schema` trait and runtime schema shapes

pub mod client;
pub mod collection;
pub mod common;
pub mod errors;
pub mod index;
pub mod schema;
