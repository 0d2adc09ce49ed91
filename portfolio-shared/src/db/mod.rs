/// Database layer
///
/// This module provides connection provisioning and the bootstrap migration
/// runner.
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with liveness check and graceful close
/// - `migrations`: Ordered SQL file runner
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
///     handle.close().await;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
