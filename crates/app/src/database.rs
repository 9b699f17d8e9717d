//! Database connection management

use std::{fmt::Display, future::Future, time::Duration};

use sqlx::{
    PgPool, Postgres, Row, Transaction,
    postgres::{PgPoolOptions, PgRow},
};
use tracing::warn;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction on a pooled connection.
    ///
    /// # Errors
    ///
    /// Returns an error when no connection can be acquired or `BEGIN` fails.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run `f`, and run it exactly once more when it fails with a
    /// connection-class error.
    ///
    /// Broken connections are discarded by the pool, so the second attempt
    /// starts on a fresh one. Any other failure, or a second failure, is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt.
    pub async fn with_retry<T, E, F, Fut>(operation: &'static str, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Transient + Display,
    {
        match f().await {
            Err(error) if error.is_transient() => {
                warn!(operation, %error, "database connection failed, retrying once");

                f().await
            }
            result => result,
        }
    }
}

/// Errors that may succeed when retried on a new connection.
pub trait Transient {
    /// Whether the failure came from the connection rather than the statement.
    fn is_transient(&self) -> bool;
}

impl Transient for sqlx::Error {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Tls(_) | Self::Protocol(_) | Self::PoolTimedOut | Self::WorkerCrashed
        )
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .test_before_acquire(true)
        .connect(database_url)
        .await
}

/// Read a non-negative `BIGINT` column as `u64`.
pub(crate) fn get_u64(row: &PgRow, column: &str) -> sqlx::Result<u64> {
    let value: i64 = row.try_get(column)?;

    u64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Read a non-negative `INTEGER` column as `u32`.
pub(crate) fn get_u32(row: &PgRow, column: &str) -> sqlx::Result<u32> {
    let value: i32 = row.try_get(column)?;

    u32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Parse a text column through [`std::str::FromStr`].
pub(crate) fn get_parsed<T>(row: &PgRow, column: &str) -> sqlx::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value: String = row.try_get(column)?;

    value.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use thiserror::Error;

    use super::*;

    #[derive(Debug, Error)]
    enum FakeError {
        #[error("connection dropped")]
        Connection,

        #[error("bad statement")]
        Statement,
    }

    impl Transient for FakeError {
        fn is_transient(&self) -> bool {
            matches!(self, Self::Connection)
        }
    }

    #[tokio::test]
    async fn retries_connection_errors_once() {
        let calls = AtomicUsize::new(0);

        let result: Result<u32, FakeError> = Db::with_retry("test", || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);

            async move {
                if attempt == 0 {
                    Err(FakeError::Connection)
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.ok(), Some(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_second_connection_error() {
        let calls = AtomicUsize::new(0);

        let result: Result<u32, FakeError> = Db::with_retry("test", || {
            calls.fetch_add(1, Ordering::SeqCst);

            async { Err(FakeError::Connection) }
        })
        .await;

        assert!(matches!(result, Err(FakeError::Connection)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn does_not_retry_statement_errors() {
        let calls = AtomicUsize::new(0);

        let result: Result<u32, FakeError> = Db::with_retry("test", || {
            calls.fetch_add(1, Ordering::SeqCst);

            async { Err(FakeError::Statement) }
        })
        .await;

        assert!(matches!(result, Err(FakeError::Statement)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pool_timeouts_are_transient() {
        assert!(sqlx::Error::PoolTimedOut.is_transient());
        assert!(!sqlx::Error::RowNotFound.is_transient());
    }
}
