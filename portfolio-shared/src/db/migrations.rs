/// Bootstrap migration runner
///
/// Executes an explicit, caller-ordered list of SQL files against the database.
/// Each file is sent verbatim as one batch over the simple-query protocol, so a
/// file may hold any number of statements.
///
/// # Behavior
///
/// - Files run strictly in the given order, one at a time
/// - The first failure stops the run; later files are not attempted
/// - Nothing is recorded about applied files, so every run re-executes every
///   file. Re-runnable SQL (`CREATE TABLE IF NOT EXISTS`, `ON CONFLICT DO
///   NOTHING`) is the responsibility of the file author.
/// - A failed batch is not rolled back by the runner and there is no transaction
///   spanning several files
///
/// # Example
///
/// ```no_run
/// use portfolio_shared::config::DatabaseSettings;
/// use portfolio_shared::db::migrations::{default_migration_paths, run_all};
/// use portfolio_shared::db::pool::connect;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = DatabaseSettings::from_env()?;
///     let handle = connect(&settings).await?;
///
///     let paths = default_migration_paths(std::env::current_dir()?);
///     let report = run_all(&handle, &paths).await?;
///     println!("Applied {} files", report.applied.len());
///
///     handle.close().await;
///     Ok(())
/// }
/// ```

use crate::db::pool::DatabaseHandle;
use async_trait::async_trait;
use sqlx::postgres::PgPool;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Schema migration, relative to the project root
pub const INIT_MIGRATION: &str = "db/migrations/001_init.sql";

/// Seed data, relative to the project root
pub const SEED_MIGRATION: &str = "db/seed/seed.sql";

/// Migration errors
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The file could not be read as text
    #[error("Failed to read SQL file {}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The database rejected the file's SQL
    #[error("Failed to execute SQL file {}", .path.display())]
    Execution {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },
}

impl MigrationError {
    /// Path of the file that failed
    pub fn path(&self) -> &Path {
        match self {
            MigrationError::FileRead { path, .. } | MigrationError::Execution { path, .. } => path,
        }
    }
}

/// A migration file and its position in the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Zero-based position in the caller-supplied sequence
    pub ordinal: usize,

    /// Path as given by the caller
    pub path: PathBuf,
}

impl MigrationFile {
    /// Base name of the file, for logging
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Files executed, in order
    pub applied: Vec<MigrationFile>,
}

impl MigrationReport {
    /// Base names of the executed files, in order
    pub fn file_names(&self) -> Vec<String> {
        self.applied.iter().map(MigrationFile::file_name).collect()
    }
}

/// Something that can execute a batch of SQL text
///
/// Implemented for the live pool; tests provide recording doubles.
#[async_trait]
pub trait BatchExecutor: Send + Sync {
    /// Executes `sql` exactly as given
    async fn execute_batch(&self, sql: &str) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl BatchExecutor for PgPool {
    async fn execute_batch(&self, sql: &str) -> Result<(), sqlx::Error> {
        let result = sqlx::raw_sql(sql).execute(self).await?;
        debug!(rows_affected = result.rows_affected(), "Batch executed");
        Ok(())
    }
}

#[async_trait]
impl BatchExecutor for DatabaseHandle {
    async fn execute_batch(&self, sql: &str) -> Result<(), sqlx::Error> {
        let _guard = self.begin()?;
        self.pool().execute_batch(sql).await
    }
}

/// Returns the default file list under `root`
///
/// Schema first, then seed data.
pub fn default_migration_paths(root: impl AsRef<Path>) -> Vec<PathBuf> {
    let root = root.as_ref();
    vec![root.join(INIT_MIGRATION), root.join(SEED_MIGRATION)]
}

/// Reads one file and executes it as a single batch
///
/// # Errors
///
/// Returns [`MigrationError::FileRead`] if the file cannot be read and
/// [`MigrationError::Execution`] if the database rejects it.
pub async fn execute_sql_file<E>(executor: &E, path: &Path) -> Result<(), MigrationError>
where
    E: BatchExecutor + ?Sized,
{
    let sql = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| MigrationError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), bytes = sql.len(), "Executing SQL file");

    executor
        .execute_batch(&sql)
        .await
        .map_err(|source| MigrationError::Execution {
            path: path.to_path_buf(),
            source,
        })
}

/// Runs every file in order, stopping at the first failure
///
/// # Errors
///
/// Returns the first [`MigrationError`] encountered; files after it are not
/// read or executed.
pub async fn run_all<E, P>(executor: &E, paths: &[P]) -> Result<MigrationReport, MigrationError>
where
    E: BatchExecutor + ?Sized,
    P: AsRef<Path>,
{
    info!(files = paths.len(), "Starting database migrations");

    let mut report = MigrationReport::default();

    for (ordinal, path) in paths.iter().enumerate() {
        let file = MigrationFile {
            ordinal,
            path: path.as_ref().to_path_buf(),
        };

        if let Err(e) = execute_sql_file(executor, &file.path).await {
            error!(file = %file.file_name(), ordinal, error = %e, "Migration failed");
            return Err(e);
        }

        info!(file = %file.file_name(), ordinal, "Successfully executed migration file");
        report.applied.push(file);
    }

    info!(applied = report.applied.len(), "All migrations completed successfully");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_order() {
        let paths = default_migration_paths("/srv/portfolio");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/srv/portfolio/db/migrations/001_init.sql"),
                PathBuf::from("/srv/portfolio/db/seed/seed.sql"),
            ]
        );
    }

    #[test]
    fn test_migration_file_name() {
        let file = MigrationFile {
            ordinal: 0,
            path: PathBuf::from("db/migrations/001_init.sql"),
        };
        assert_eq!(file.file_name(), "001_init.sql");
    }

    #[test]
    fn test_error_path() {
        let err = MigrationError::FileRead {
            path: PathBuf::from("missing.sql"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.path(), Path::new("missing.sql"));
        assert_eq!(err.to_string(), "Failed to read SQL file missing.sql");
        assert!(std::error::Error::source(&err).is_some());
    }

    // Runner behavior is covered with a recording executor in tests/db_migrations_tests.rs
}
