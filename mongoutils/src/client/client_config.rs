use crate::common::{millis, DEFAULT_CONNECT_TIMEOUT_MS};
use crate::errors::{ErrorKind, MongoUtilsError, MongoUtilsResult};
use mongodb::options::{ClientOptions, Credential, ServerAddress};
use std::env;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// Settings used to connect a [`Client`](crate::client::Client).
///
/// Built with [`ClientConfig::builder`] or read from the environment with
/// [`ClientConfig::from_env`].
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    hosts: Vec<String>,
    username: Option<String>,
    password: Option<String>,
    auth_source: Option<String>,
    app_name: Option<String>,
    connect_timeout_ms: u64,
}

impl ClientConfig {
    /// Creates a builder with no hosts and the default connect timeout.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Reads `<prefix>_HOSTS`, `<prefix>_USERNAME`, `<prefix>_PASSWORD` and
    /// `<prefix>_CONNECTION_TIMEOUT_MS`.
    ///
    /// A missing or unparsable timeout falls back to the default with a
    /// warning; missing hosts are an error.
    pub fn from_env(prefix: &str) -> MongoUtilsResult<ClientConfig> {
        let hosts_var = format!("{}_HOSTS", prefix);
        let hosts = env::var(&hosts_var).map_err(|_| {
            log::error!("Environment variable {} is not set", hosts_var);
            MongoUtilsError::new(
                &format!("Environment variable {} is not set", hosts_var),
                ErrorKind::InvalidConfiguration,
            )
        })?;

        let mut builder = ClientConfig::builder().hosts_str(&hosts);

        if let Ok(username) = env::var(format!("{}_USERNAME", prefix)) {
            builder = builder.username(&username);
        }
        if let Ok(password) = env::var(format!("{}_PASSWORD", prefix)) {
            builder = builder.password(&password);
        }

        let timeout_var = format!("{}_CONNECTION_TIMEOUT_MS", prefix);
        let timeout = env::var(&timeout_var)
            .ok()
            .and_then(|value| match value.trim().parse::<u64>() {
                Ok(timeout) => Some(timeout),
                Err(err) => {
                    log::warn!(
                        "Error reading {} ({}), will use {}ms",
                        timeout_var,
                        err,
                        DEFAULT_CONNECT_TIMEOUT_MS
                    );
                    None
                }
            })
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS);

        builder.connect_timeout_ms(timeout).build()
    }

    /// The `host[:port]` seed list.
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// The username, if credentials are configured.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// The password, if credentials are configured.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// The database credentials are checked against.
    pub fn auth_source(&self) -> Option<&str> {
        self.auth_source.as_deref()
    }

    /// The application name reported to the server.
    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    /// The deadline for connecting and for server selection.
    pub fn connect_timeout(&self) -> Duration {
        millis(self.connect_timeout_ms)
    }

    /// Translates the configuration into driver options.
    ///
    /// Credentials are attached only when a non-empty username is set. The
    /// connect timeout bounds both socket connection and server selection,
    /// so an unreachable host fails instead of waiting the driver's 30s
    /// default.
    pub fn to_client_options(&self) -> MongoUtilsResult<ClientOptions> {
        let mut hosts = Vec::with_capacity(self.hosts.len());
        for host in &self.hosts {
            hosts.push(ServerAddress::parse(host)?);
        }

        let mut options = ClientOptions::builder().hosts(hosts).build();
        options.connect_timeout = Some(self.connect_timeout());
        options.server_selection_timeout = Some(self.connect_timeout());
        options.app_name = self.app_name.clone();

        if let Some(username) = self.username.as_ref().filter(|u| !u.is_empty()) {
            let mut credential = Credential::default();
            credential.username = Some(username.clone());
            credential.password = self.password.clone();
            credential.source = self.auth_source.clone();
            options.credential = Some(credential);
        }

        Ok(options)
    }
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("hosts", &self.hosts)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("auth_source", &self.auth_source)
            .field("app_name", &self.app_name)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

/// Builder for [`ClientConfig`].
///
/// Setter errors are captured and returned by [`ClientConfigBuilder::build`],
/// so the chain itself never fails.
///
/// # Examples
///
/// ```rust,ignore
/// use mongoutils::client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .hosts_str("localhost:27017")
///     .username("root")
///     .password("root")
///     .connect_timeout_ms(1000)
///     .build()?;
/// ```
pub struct ClientConfigBuilder {
    error: Option<MongoUtilsError>,
    config: ClientConfig,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        ClientConfigBuilder {
            error: None,
            config: ClientConfig {
                hosts: Vec::new(),
                username: None,
                password: None,
                auth_source: None,
                app_name: None,
                connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            },
        }
    }

    /// Adds a single `host[:port]`.
    pub fn host(mut self, host: &str) -> Self {
        if self.error.is_none() {
            match parse_hosts(host) {
                Ok(hosts) => self.config.hosts.extend(hosts),
                Err(e) => self.error = Some(e),
            }
        }
        self
    }

    /// Adds several hosts.
    pub fn hosts(mut self, hosts: &[&str]) -> Self {
        for host in hosts {
            self = self.host(host);
        }
        self
    }

    /// Adds hosts from a comma separated list such as `"h1:27017,h2"`.
    pub fn hosts_str(self, hosts: &str) -> Self {
        self.host(hosts)
    }

    pub fn username(mut self, username: &str) -> Self {
        self.config.username = Some(username.to_string());
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.config.password = Some(password.to_string());
        self
    }

    /// Database holding the user's credentials, `admin` when unset.
    pub fn auth_source(mut self, auth_source: &str) -> Self {
        self.config.auth_source = Some(auth_source.to_string());
        self
    }

    pub fn app_name(mut self, app_name: &str) -> Self {
        self.config.app_name = Some(app_name.to_string());
        self
    }

    /// Deadline for connecting and selecting a server, in milliseconds.
    pub fn connect_timeout_ms(mut self, timeout_ms: u64) -> Self {
        if self.error.is_none() {
            if timeout_ms == 0 {
                log::error!("Connect timeout must be greater than zero");
                self.error = Some(MongoUtilsError::new(
                    "Connect timeout must be greater than zero",
                    ErrorKind::InvalidConfiguration,
                ));
            } else {
                self.config.connect_timeout_ms = timeout_ms;
            }
        }
        self
    }

    /// Finalizes the configuration.
    ///
    /// # Errors
    ///
    /// The first error captured by a setter, or
    /// [`ErrorKind::InvalidConfiguration`] when no host was given.
    pub fn build(self) -> MongoUtilsResult<ClientConfig> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.config.hosts.is_empty() {
            log::error!("Client configuration has no hosts");
            return Err(MongoUtilsError::new(
                "At least one host is required",
                ErrorKind::InvalidConfiguration,
            ));
        }
        Ok(self.config)
    }
}

/// Splits a comma separated host list, dropping empty entries.
///
/// # Errors
///
/// [`ErrorKind::InvalidConfiguration`] when a port is not a valid `u16`.
pub fn parse_hosts(hosts: &str) -> MongoUtilsResult<Vec<String>> {
    let mut parsed = Vec::new();
    for host in hosts.split(',') {
        let host = host.trim();
        if host.is_empty() {
            continue;
        }

        if let Some((name, port)) = host.rsplit_once(':') {
            if name.is_empty() {
                log::error!("Host '{}' has no host name", host);
                return Err(MongoUtilsError::new(
                    &format!("Host '{}' has no host name", host),
                    ErrorKind::InvalidConfiguration,
                ));
            }
            if port.parse::<u16>().is_err() {
                log::error!("Host '{}' has an invalid port", host);
                return Err(MongoUtilsError::new(
                    &format!("Host '{}' has an invalid port '{}'", host, port),
                    ErrorKind::InvalidConfiguration,
                ));
            }
        }
        parsed.push(host.to_string());
    }
    Ok(parsed)
}
