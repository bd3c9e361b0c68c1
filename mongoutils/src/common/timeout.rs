use crate::errors::{MongoUtilsError, MongoUtilsResult};
use std::future::IntoFuture;
use std::time::Duration;

/// Runs a driver future under a deadline.
///
/// Accepts anything awaitable, including the driver's action builders
/// (`collection.find(filter)`, `database.drop()`).
///
/// An elapsed deadline becomes [`ErrorKind::Timeout`](crate::errors::ErrorKind::Timeout);
/// the future's own error is converted through `From`.
pub async fn with_timeout<F, T, E>(timeout: Duration, future: F) -> MongoUtilsResult<T>
where
    F: IntoFuture<Output = Result<T, E>>,
    MongoUtilsError: From<E>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result.map_err(MongoUtilsError::from),
        Err(elapsed) => {
            log::debug!("Operation exceeded its deadline of {:?}", timeout);
            Err(<MongoUtilsError as From<tokio::time::error::Elapsed>>::from(elapsed))
        }
    }
}

/// Converts a millisecond count into a `Duration`.
pub fn millis(timeout_ms: u64) -> Duration {
    Duration::from_millis(timeout_ms)
}
