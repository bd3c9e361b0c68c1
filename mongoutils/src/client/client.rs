use crate::client::ClientConfig;
use crate::common::{with_timeout, ADMIN_DATABASE};
use crate::errors::{MongoUtilsError, MongoUtilsResult};
use mongodb::bson::doc;
use mongodb::Database;
use std::sync::Arc;
use std::time::Duration;

/// A connected MongoDB client.
///
/// Clones share the same driver client and its connection pool.
///
/// # Examples
///
/// ```rust,ignore
/// use mongoutils::client::{Client, ClientConfig};
///
/// let config = ClientConfig::builder()
///     .hosts_str("localhost:27017")
///     .username("root")
///     .password("root")
///     .build()?;
/// let client = Client::connect(config).await?;
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    client: mongodb::Client,
    config: ClientConfig,
}

impl Client {
    /// Creates the driver client and verifies the server answers a `ping`
    /// within the connect timeout.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Timeout`](crate::errors::ErrorKind::Timeout) or
    /// [`ErrorKind::ConnectionError`](crate::errors::ErrorKind::ConnectionError)
    /// when no server can be reached, and driver errors such as failed
    /// authentication.
    pub async fn connect(config: ClientConfig) -> MongoUtilsResult<Client> {
        let client = Client::lazy(config)?;
        if let Err(err) = client.ping().await {
            log::error!(
                "Failed to connect to {:?}: {}",
                client.inner.config.hosts(),
                err
            );
            return Err(MongoUtilsError::wrap("Error connecting to MongoDB", err));
        }

        log::info!("Connected to MongoDB at {:?}", client.inner.config.hosts());
        Ok(client)
    }

    /// Creates the driver client without contacting the server.
    ///
    /// Connections are opened on first use; errors surface from the first
    /// operation instead of here.
    pub fn lazy(config: ClientConfig) -> MongoUtilsResult<Client> {
        let options = config.to_client_options()?;
        let client = mongodb::Client::with_options(options)?;
        Ok(Client {
            inner: Arc::new(ClientInner { client, config }),
        })
    }

    /// Runs `{ping: 1}` against the admin database.
    pub async fn ping(&self) -> MongoUtilsResult<()> {
        let admin = self.inner.client.database(ADMIN_DATABASE);
        with_timeout(
            self.inner.config.connect_timeout(),
            admin.run_command(doc! { "ping": 1 }),
        )
        .await?;
        Ok(())
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The underlying driver client.
    pub fn inner(&self) -> &mongodb::Client {
        &self.inner.client
    }

    pub fn database(&self, name: &str) -> Database {
        self.inner.client.database(name)
    }

    /// Drops a whole database.
    pub async fn drop_database(&self, name: &str, timeout: Duration) -> MongoUtilsResult<()> {
        log::debug!("Dropping database '{}'", name);
        let database = self.database(name);
        with_timeout(timeout, database.drop())
            .await
            .map_err(|e| MongoUtilsError::wrap(&format!("Error dropping database '{}'", name), e))
    }

    /// Names of the collections in a database.
    pub async fn list_collection_names(
        &self,
        database: &str,
        timeout: Duration,
    ) -> MongoUtilsResult<Vec<String>> {
        let database = self.database(database);
        with_timeout(timeout, database.list_collection_names()).await
    }

    /// Closes the client's connections.
    ///
    /// Other clones of this client must not be used afterwards.
    pub async fn disconnect(self) -> MongoUtilsResult<()> {
        let timeout = self.inner.config.connect_timeout();
        let client = self.inner.client.clone();
        tokio::time::timeout(timeout, client.shutdown()).await?;
        log::info!("Disconnected from MongoDB at {:?}", self.inner.config.hosts());
        Ok(())
    }
}
