//! Client configuration and connection.
//!
//! ```rust,ignore
//! use mongoutils::client::{Client, ClientConfig, Connection};
//!
//! let config = ClientConfig::from_env("MONGO")?;
//! let client = Client::connect(config).await?;
//!
//! // every collection operation on this connection gets 5s
//! let connection = Connection::new(client, 5000)?;
//! ```

mod client;
mod client_config;
mod connection;

pub use client::*;
pub use client_config::*;
pub use connection::*;
