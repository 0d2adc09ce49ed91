/// Data models
///
/// # Models
///
/// - `profile`: Portfolio profile record and the sources that serve it
///
/// # Example
///
/// ```no_run
/// use portfolio_shared::config::DatabaseSettings;
/// use portfolio_shared::db::pool::connect;
/// use portfolio_shared::models::profile::{DatabaseProfileSource, ProfileSource};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = connect(&DatabaseSettings::from_env()?).await?;
/// let source = DatabaseProfileSource::new(handle);
///
/// for profile in source.profiles().await? {
///     println!("{}: {}", profile.id, profile.name);
/// }
/// # Ok(())
/// # }
/// ```

pub mod profile;
