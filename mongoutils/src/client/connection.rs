use crate::client::Client;
use crate::common::millis;
use crate::errors::{ErrorKind, MongoUtilsError, MongoUtilsResult};
use std::time::Duration;

/// A client paired with the deadline applied to every collection operation.
///
/// The resource timeout is separate from the client's connect timeout: a
/// slow aggregation may deserve more time than establishing a connection.
#[derive(Clone)]
pub struct Connection {
    client: Client,
    timeout: Duration,
}

impl Connection {
    /// Creates a connection with a per-operation timeout in milliseconds.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidConfiguration`] when `timeout_ms` is zero.
    pub fn new(client: Client, timeout_ms: u64) -> MongoUtilsResult<Self> {
        if timeout_ms == 0 {
            log::error!("Resource timeout must be greater than zero");
            return Err(MongoUtilsError::new(
                "Resource timeout must be greater than zero",
                ErrorKind::InvalidConfiguration,
            ));
        }
        Ok(Connection {
            client,
            timeout: millis(timeout_ms),
        })
    }

    /// The shared client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The deadline applied to each round trip.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
