//! bb8 pool of async PostgreSQL connections.
//!
//! Built once in `main` and passed by value into every Diesel adapter and the
//! example-data seeder; nothing reaches it through a global.

use std::time::Duration;

use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
use tracing::info;

/// Pool construction or checkout failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection became available in time, or the server refused one.
    #[error("connection checkout failed: {message}")]
    Checkout { message: String },

    /// Invalid sizing or unreachable database at startup.
    #[error("pool construction failed: {message}")]
    Build { message: String },
}

impl PoolError {
    pub(crate) fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub(crate) fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Sizing and timeout settings for [`DbPool`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use bloodbank::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://bloodbank@localhost/bloodbank")
///     .with_max_size(20)
///     .with_connection_timeout(Duration::from_secs(5));
/// assert_eq!(config.database_url(), "postgres://bloodbank@localhost/bloodbank");
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Defaults: 10 connections, 2 kept idle, 30 second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: 10,
            min_idle: Some(2),
            connection_timeout: Duration::from_secs(30),
        }
    }

    /// Upper bound on open connections.
    #[must_use]
    pub const fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Connections kept open while idle; capped at the pool size.
    #[must_use]
    pub const fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    /// How long a checkout waits before failing.
    #[must_use]
    pub const fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Connection string, also used by the migration runner.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Reject an empty pool and cap `min_idle` at `max_size`.
    fn validated(mut self) -> Result<Self, PoolError> {
        if self.max_size == 0 {
            return Err(PoolError::build("max_size must be at least 1"));
        }
        self.min_idle = self.min_idle.map(|idle| idle.min(self.max_size));
        Ok(self)
    }
}

/// Cloneable handle to the bb8 pool of `AsyncPgConnection`s.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool, opening `min_idle` connections eagerly.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Build` when `max_size` is zero, the URL is
    /// malformed or the initial connections cannot be opened.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let config = config.validated()?;
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        info!(
            max_size = config.max_size,
            min_idle = config.min_idle,
            timeout_secs = config.connection_timeout.as_secs(),
            "database pool ready"
        );

        Ok(Self { inner: pool })
    }

    /// Check out a connection.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` when no connection frees up within the
    /// configured timeout. Repositories surface this as a connection error,
    /// which the HTTP layer reports as `503 service_unavailable`.
    pub async fn get(
        &self,
    ) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}
