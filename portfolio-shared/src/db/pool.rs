/// Database connection pool management
///
/// This module turns [`DatabaseSettings`] into a live PostgreSQL connection pool.
/// A [`DatabaseHandle`] is only ever handed out after a liveness query has
/// succeeded against the new pool.
///
/// Work issued through the handle is tracked with an [`OperationGuard`];
/// [`DatabaseHandle::close`] waits for every outstanding guard before the pool
/// is shut down.
///
/// # Example
///
/// ```no_run
/// use portfolio_shared::config::DatabaseSettings;
/// use portfolio_shared::db::pool::connect;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = DatabaseSettings::from_env()?;
///     let handle = connect(&settings).await?;
///
///     let guard = handle.begin()?;
///     let row: (i64,) = sqlx::query_as("SELECT $1")
///         .bind(42i64)
///         .fetch_one(handle.pool())
///         .await?;
///     drop(guard);
///
///     handle.close().await;
///     Ok(())
/// }
/// ```

use crate::config::DatabaseSettings;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use std::fmt;
use std::time::Duration;
use tokio_util::task::{task_tracker::TaskTrackerToken, TaskTracker};
use tracing::{debug, info, warn};

/// Connection provisioning errors
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// The settings could not be turned into connect options
    #[error("Failed to parse database connection settings")]
    Parse(#[source] sqlx::Error),

    /// The pool could not open its connections
    #[error("Failed to create connection pool")]
    PoolCreation(#[source] sqlx::Error),

    /// The pool was created but the round-trip query failed
    #[error("Failed to ping database")]
    LivenessCheck(#[source] sqlx::Error),
}

/// Shareable handle to the connection pool
///
/// Cloning is cheap; all clones refer to the same pool and the same set of
/// in-flight operations. Closing any clone closes the pool for all of them.
#[derive(Debug, Clone)]
pub struct DatabaseHandle {
    pool: PgPool,
    in_flight: TaskTracker,
}

/// Marks one operation on a [`DatabaseHandle`] as in flight until dropped
#[must_use = "the operation is only tracked while the guard is alive"]
pub struct OperationGuard {
    _token: TaskTrackerToken,
}

impl fmt::Debug for OperationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationGuard").finish_non_exhaustive()
    }
}

/// Pool statistics for monitoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub active_connections: usize,

    /// Number of idle connections available
    pub idle_connections: usize,

    /// Total connections in the pool
    pub total_connections: usize,
}

impl PoolStats {
    /// Builds stats from raw pool counters
    ///
    /// The two counters are read separately and can disagree while the pool is
    /// shutting down, so idle is capped at the total.
    pub fn from_counts(size: u32, idle: usize) -> Self {
        let total = size as usize;
        let idle = idle.min(total);

        Self {
            active_connections: total - idle,
            idle_connections: idle,
            total_connections: total,
        }
    }
}

/// Builds the connect options for the given settings
///
/// # Errors
///
/// Returns [`ConnectionError::Parse`] if the SSL mode is not recognised.
pub fn connect_options(settings: &DatabaseSettings) -> Result<PgConnectOptions, ConnectionError> {
    let ssl_mode = settings
        .ssl_mode
        .parse::<PgSslMode>()
        .map_err(ConnectionError::Parse)?;

    Ok(PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(&settings.database_name)
        .ssl_mode(ssl_mode))
}

fn pool_options(settings: &DatabaseSettings) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_seconds))
}

/// Creates the connection pool and verifies it
///
/// This function:
/// 1. Builds connect options from the settings
/// 2. Creates a bounded pool
/// 3. Runs a liveness query, closing the pool again if it fails
///
/// Steps 2 and 3 are each bounded by `connect_timeout_seconds`, so an
/// unreachable server fails fast instead of waiting out the acquire timeout.
///
/// # Errors
///
/// Returns an error if:
/// - The SSL mode is invalid
/// - Cannot connect to the database within the connect deadline
/// - The liveness query fails
pub async fn connect(settings: &DatabaseSettings) -> Result<DatabaseHandle, ConnectionError> {
    info!(
        url = %settings.redacted_url(),
        max_connections = settings.max_connections,
        min_connections = settings.min_connections,
        acquire_timeout_seconds = settings.acquire_timeout_seconds,
        connect_timeout_seconds = settings.connect_timeout_seconds,
        "Creating database connection pool"
    );

    let options = connect_options(settings)?;
    let deadline = Duration::from_secs(settings.connect_timeout_seconds);

    let pool = tokio::time::timeout(deadline, pool_options(settings).connect_with(options))
        .await
        .map_err(|_| ConnectionError::PoolCreation(sqlx::Error::PoolTimedOut))?
        .map_err(ConnectionError::PoolCreation)?;

    let liveness = tokio::time::timeout(deadline, health_check(&pool))
        .await
        .unwrap_or(Err(sqlx::Error::PoolTimedOut));

    if let Err(e) = liveness {
        warn!(error = %e, "Liveness check failed, releasing pool");
        pool.close().await;
        return Err(ConnectionError::LivenessCheck(e));
    }

    info!("Successfully connected to PostgreSQL database");
    Ok(DatabaseHandle::from_pool(pool))
}

/// Runs the liveness query against a pool
///
/// # Errors
///
/// Returns an error if the query fails or returns something other than 1
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    debug!("Performing database health check");

    let result: (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if result.0 == 1 {
        debug!("Database health check passed");
        Ok(())
    } else {
        warn!("Database health check returned unexpected value: {}", result.0);
        Err(sqlx::Error::Protocol(
            "Health check returned unexpected value".into(),
        ))
    }
}

/// Closes an optional handle
///
/// `None` stands for a connection that was never established and is a no-op.
pub async fn close_handle(handle: Option<&DatabaseHandle>) {
    if let Some(handle) = handle {
        handle.close().await;
    }
}

impl DatabaseHandle {
    fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            in_flight: TaskTracker::new(),
        }
    }

    /// Returns the underlying pool
    ///
    /// Queries issued on the pool are only waited for by [`Self::close`] while
    /// a guard from [`Self::begin`] is held.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Registers an in-flight operation
    ///
    /// # Errors
    ///
    /// Returns [`sqlx::Error::PoolClosed`] once [`Self::close`] has started.
    pub fn begin(&self) -> Result<OperationGuard, sqlx::Error> {
        if self.is_closed() {
            return Err(sqlx::Error::PoolClosed);
        }

        Ok(OperationGuard {
            _token: self.in_flight.token(),
        })
    }

    /// Re-runs the liveness query
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        let _guard = self.begin()?;
        health_check(&self.pool).await
    }

    /// Returns true once closing has started
    pub fn is_closed(&self) -> bool {
        self.in_flight.is_closed() || self.pool.is_closed()
    }

    /// Number of operations currently holding a guard
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Gets current pool statistics
    pub fn stats(&self) -> PoolStats {
        PoolStats::from_counts(self.pool.size(), self.pool.num_idle())
    }

    /// Gracefully closes the pool
    ///
    /// New operations are refused immediately. The call then waits until every
    /// operation that already holds a guard has finished, and until every
    /// checked-out connection is returned. Every caller waits, including ones
    /// that arrive after closing has started.
    pub async fn close(&self) {
        let first = self.in_flight.close();
        if first {
            info!(in_flight = self.in_flight.len(), "Closing database connection pool");
        } else {
            debug!("Database connection pool already closing");
        }

        self.in_flight.wait().await;
        self.pool.close().await;

        if first {
            info!("Database connection pool closed");
        }
    }
}
