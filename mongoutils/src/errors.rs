use backtrace::Backtrace;
use mongodb::bson;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for mongoutils operations.
///
/// Each kind names the stage of an operation that failed, so callers can
/// tell a rejected argument apart from a failure reported by the driver.
///
/// # Examples
///
/// ```rust,ignore
/// use mongoutils::errors::{ErrorKind, MongoUtilsError, MongoUtilsResult};
///
/// fn example() -> MongoUtilsResult<()> {
///     Err(MongoUtilsError::new("hosts cannot be empty", ErrorKind::InvalidConfiguration))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// Client or collection configuration is incomplete or malformed
    InvalidConfiguration,
    /// The server could not be reached or selected
    ConnectionError,
    /// The schema type itself is unusable (no fields, duplicate keys)
    InvalidSchema,
    /// An argument does not match the collection's schema
    SchemaMismatch,
    /// An index references unknown fields or has no columns
    InvalidIndex,
    /// A value could not be encoded into a BSON document
    EncodingError,
    /// A BSON document could not be decoded into the schema type
    DecodingError,
    /// A driver round trip did not finish within its deadline
    Timeout,
    /// The driver or server reported an error
    DriverError,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidConfiguration => write!(f, "Invalid configuration"),
            ErrorKind::ConnectionError => write!(f, "Connection error"),
            ErrorKind::InvalidSchema => write!(f, "Invalid schema"),
            ErrorKind::SchemaMismatch => write!(f, "Schema mismatch"),
            ErrorKind::InvalidIndex => write!(f, "Invalid index"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::DecodingError => write!(f, "Decoding error"),
            ErrorKind::Timeout => write!(f, "Timeout"),
            ErrorKind::DriverError => write!(f, "Driver error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type for all mongoutils operations.
///
/// `MongoUtilsError` carries a message, a kind and an optional cause, so an
/// operation can report where it failed ("find: cursor decode error") while
/// keeping the underlying driver or codec error reachable through
/// [`Error::source`].
///
/// # Examples
///
/// ```rust,ignore
/// use mongoutils::errors::{ErrorKind, MongoUtilsError};
///
/// let cause = MongoUtilsError::new("unknown key 'mismatch'", ErrorKind::SchemaMismatch);
/// let err = MongoUtilsError::new_with_cause(
///     "delete_many: schema verification error",
///     ErrorKind::SchemaMismatch,
///     cause,
/// );
/// ```
#[derive(Clone)]
pub struct MongoUtilsError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<MongoUtilsError>>,
    backtrace: Arc<Backtrace>,
}

impl MongoUtilsError {
    /// Creates a new error with the specified message and kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        MongoUtilsError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new error wrapping `cause`.
    ///
    /// The cause is kept for `Debug` output and [`Error::source`].
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: MongoUtilsError) -> Self {
        MongoUtilsError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Wraps `cause` with a context message, keeping the cause's kind.
    pub fn wrap(message: &str, cause: MongoUtilsError) -> Self {
        let kind = cause.error_kind.clone();
        MongoUtilsError::new_with_cause(message, kind, cause)
    }

    /// The message of this error, without its causes.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    /// The error this one wraps, if any.
    pub fn cause(&self) -> Option<&MongoUtilsError> {
        self.cause.as_deref()
    }

    /// Returns the innermost error of the cause chain.
    pub fn root_cause(&self) -> &MongoUtilsError {
        let mut current = self;
        while let Some(cause) = current.cause.as_deref() {
            current = cause;
        }
        current
    }
}

impl Display for MongoUtilsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for MongoUtilsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for MongoUtilsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for mongoutils operations.
pub type MongoUtilsResult<T> = Result<T, MongoUtilsError>;

impl From<mongodb::error::Error> for MongoUtilsError {
    fn from(err: mongodb::error::Error) -> Self {
        let error_kind = match *err.kind {
            mongodb::error::ErrorKind::ServerSelection { .. }
            | mongodb::error::ErrorKind::Io(_)
            | mongodb::error::ErrorKind::DnsResolve { .. }
            | mongodb::error::ErrorKind::ConnectionPoolCleared { .. } => ErrorKind::ConnectionError,
            mongodb::error::ErrorKind::InvalidArgument { .. } => ErrorKind::InvalidConfiguration,
            mongodb::error::ErrorKind::BsonSerialization(_) => ErrorKind::EncodingError,
            mongodb::error::ErrorKind::BsonDeserialization(_) => ErrorKind::DecodingError,
            _ => ErrorKind::DriverError,
        };
        MongoUtilsError::new(&format!("MongoDB error: {}", err), error_kind)
    }
}

impl From<bson::ser::Error> for MongoUtilsError {
    fn from(err: bson::ser::Error) -> Self {
        MongoUtilsError::new(
            &format!("BSON encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<bson::de::Error> for MongoUtilsError {
    fn from(err: bson::de::Error) -> Self {
        MongoUtilsError::new(
            &format!("BSON decoding error: {}", err),
            ErrorKind::DecodingError,
        )
    }
}

impl From<tokio::time::error::Elapsed> for MongoUtilsError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        MongoUtilsError::new(&format!("Operation timed out: {}", err), ErrorKind::Timeout)
    }
}

impl From<std::num::ParseIntError> for MongoUtilsError {
    fn from(err: std::num::ParseIntError) -> Self {
        MongoUtilsError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::InvalidConfiguration,
        )
    }
}

impl From<String> for MongoUtilsError {
    fn from(msg: String) -> Self {
        MongoUtilsError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for MongoUtilsError {
    fn from(msg: &str) -> Self {
        MongoUtilsError::new(msg, ErrorKind::InternalError)
    }
}
