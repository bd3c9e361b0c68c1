use mongoutils::client::{Client, ClientConfig, Connection};
use mongoutils::common::{millis, DEFAULT_RESOURCE_TIMEOUT_MS};
use mongoutils::errors::MongoUtilsResult;
use std::env;
use std::future::Future;
use std::time::Duration;

/// Prefix of the environment variables describing the test server.
pub const TEST_ENV_PREFIX: &str = "MONGO_TEST";

/// Runs `test` against a fresh, uniquely named database and drops it
/// afterwards, whether the test succeeded or not.
///
/// Without `MONGO_TEST_HOSTS` the test is skipped with a warning.
pub async fn run_test<T, Fut>(test: T)
where
    T: FnOnce(TestContext) -> Fut,
    Fut: Future<Output = MongoUtilsResult<()>>,
{
    let ctx = match create_test_context().await {
        Ok(Some(ctx)) => ctx,
        Ok(None) => return,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let result = test(ctx.clone()).await;
    let after = cleanup(ctx).await;

    if let Err(e) = result {
        panic!("Test failed: {:?}", e);
    }
    if let Err(e) = after {
        panic!("After run failed: {:?}", e);
    }
}

#[derive(Clone)]
pub struct TestContext {
    client: Client,
    connection: Connection,
    database: String,
}

impl TestContext {
    pub fn new(client: Client, connection: Connection, database: String) -> Self {
        Self {
            client,
            connection,
            database,
        }
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    pub fn connection(&self) -> Connection {
        self.connection.clone()
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn timeout(&self) -> Duration {
        self.connection.timeout()
    }
}

/// Whether a test server is configured.
pub fn server_configured() -> bool {
    match env::var(format!("{}_HOSTS", TEST_ENV_PREFIX)) {
        Ok(hosts) => !hosts.trim().is_empty(),
        Err(_) => {
            log::warn!(
                "{}_HOSTS is not set, skipping tests that need a MongoDB server",
                TEST_ENV_PREFIX
            );
            false
        }
    }
}

/// Reads the test client configuration from the environment.
pub fn test_client_config() -> MongoUtilsResult<ClientConfig> {
    ClientConfig::from_env(TEST_ENV_PREFIX)
}

/// Resource timeout from `MONGO_TEST_RESOURCE_TIMEOUT_MS`, defaulting to
/// 3000ms.
pub fn resource_timeout_ms() -> u64 {
    let var = format!("{}_RESOURCE_TIMEOUT_MS", TEST_ENV_PREFIX);
    match env::var(&var) {
        Ok(value) => match value.trim().parse::<u64>() {
            Ok(timeout) => timeout,
            Err(e) => {
                log::warn!(
                    "Error reading {} ({}), will use {}ms",
                    var,
                    e,
                    DEFAULT_RESOURCE_TIMEOUT_MS
                );
                DEFAULT_RESOURCE_TIMEOUT_MS
            }
        },
        Err(_) => DEFAULT_RESOURCE_TIMEOUT_MS,
    }
}

pub fn random_database() -> String {
    format!("mongoutils_test_{}", uuid::Uuid::new_v4().simple())
}

pub async fn create_test_context() -> MongoUtilsResult<Option<TestContext>> {
    if !server_configured() {
        return Ok(None);
    }

    let config = test_client_config()?;
    let client = Client::connect(config).await?;
    let connection = Connection::new(client.clone(), resource_timeout_ms())?;
    Ok(Some(TestContext::new(client, connection, random_database())))
}

/// Drops the test database and shuts the client down.
///
/// Teardown failures are logged and never fail a test whose body passed.
pub async fn cleanup(ctx: TestContext) -> MongoUtilsResult<()> {
    let timeout = millis(resource_timeout_ms());
    if let Err(e) = ctx.client.drop_database(ctx.database(), timeout).await {
        log::warn!("Failed to drop test database {}: {:?}", ctx.database(), e);
    }
    if let Err(e) = ctx.client.disconnect().await {
        log::warn!("Failed to disconnect test client: {:?}", e);
    }
    Ok(())
}
