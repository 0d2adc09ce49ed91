/// Profile model and profile sources
///
/// The service reads profiles through the [`ProfileSource`] trait. Two sources
/// exist: [`DatabaseProfileSource`] reads the `profiles` table, and
/// [`StaticProfileSource`] serves a fixed record when no database is available.
/// The service picks one at startup and injects it into the request handlers.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE IF NOT EXISTS profiles (
///     id SERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use portfolio_shared::models::profile::{ProfileSource, StaticProfileSource};
///
/// # async fn example() -> Result<(), portfolio_shared::models::profile::ProfileError> {
/// let source = StaticProfileSource::new();
/// if let Some(profile) = source.profile().await? {
///     println!("{} - {}", profile.name, profile.title);
/// }
/// # Ok(())
/// # }
/// ```

use crate::db::pool::DatabaseHandle;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// ID of the profile served by the single-profile queries
pub const PRIMARY_PROFILE_ID: i32 = 1;

/// Profile lookup errors
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The database query failed
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

/// Portfolio profile record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    /// Profile ID
    pub id: i32,

    /// Display name
    pub name: String,

    /// Job title
    pub title: String,

    /// Short description
    pub description: String,
}

impl Profile {
    /// The record served when no database is available
    pub fn fallback() -> Self {
        Self {
            id: PRIMARY_PROFILE_ID,
            name: "Likhith Vardhan".to_string(),
            title: "Software Developer".to_string(),
            description:
                "Passionate about creating innovative solutions with cutting-edge technology."
                    .to_string(),
        }
    }
}

/// Which kind of source backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSourceKind {
    /// Profiles come from the `profiles` table
    Database,

    /// Profiles come from built-in data
    Static,
}

impl ProfileSourceKind {
    /// Converts kind to string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileSourceKind::Database => "database",
            ProfileSourceKind::Static => "static",
        }
    }
}

impl fmt::Display for ProfileSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of profile records
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Which kind of source this is
    fn kind(&self) -> ProfileSourceKind;

    /// Returns the primary profile, if present
    async fn profile(&self) -> Result<Option<Profile>, ProfileError>;

    /// Returns every profile, ordered by ID
    async fn profiles(&self) -> Result<Vec<Profile>, ProfileError>;
}

/// Profiles backed by the `profiles` table
#[derive(Debug, Clone)]
pub struct DatabaseProfileSource {
    db: DatabaseHandle,
}

impl DatabaseProfileSource {
    /// Creates a source reading through the given handle
    pub fn new(db: DatabaseHandle) -> Self {
        Self { db }
    }

    /// Returns the handle this source reads through
    pub fn handle(&self) -> &DatabaseHandle {
        &self.db
    }
}

#[async_trait]
impl ProfileSource for DatabaseProfileSource {
    fn kind(&self) -> ProfileSourceKind {
        ProfileSourceKind::Database
    }

    async fn profile(&self) -> Result<Option<Profile>, ProfileError> {
        debug!(id = PRIMARY_PROFILE_ID, "Fetching profile");
        let _guard = self.db.begin()?;

        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, name, title, description FROM profiles WHERE id = $1",
        )
        .bind(PRIMARY_PROFILE_ID)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(profile)
    }

    async fn profiles(&self) -> Result<Vec<Profile>, ProfileError> {
        debug!("Fetching all profiles");
        let _guard = self.db.begin()?;

        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT id, name, title, description FROM profiles ORDER BY id",
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(profiles)
    }
}

/// Built-in profile data for running without a database
#[derive(Debug, Clone)]
pub struct StaticProfileSource {
    profile: Profile,
}

impl StaticProfileSource {
    /// Creates a source serving [`Profile::fallback`]
    pub fn new() -> Self {
        Self::with_profile(Profile::fallback())
    }

    /// Creates a source serving the given record
    pub fn with_profile(profile: Profile) -> Self {
        Self { profile }
    }
}

impl Default for StaticProfileSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileSource for StaticProfileSource {
    fn kind(&self) -> ProfileSourceKind {
        ProfileSourceKind::Static
    }

    async fn profile(&self) -> Result<Option<Profile>, ProfileError> {
        Ok(Some(self.profile.clone()))
    }

    async fn profiles(&self) -> Result<Vec<Profile>, ProfileError> {
        Ok(vec![self.profile.clone()])
    }
}
