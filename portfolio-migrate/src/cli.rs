/// Migrate command
///
/// Loads the database settings, connects, and runs the SQL files in the order
/// given on the command line. Without arguments the bundled schema and seed
/// files are used, resolved against the working directory.
///
/// # Usage
///
/// ```bash
/// portfolio-migrate
/// portfolio-migrate db/migrations/001_init.sql db/seed/seed.sql
/// ```

use anyhow::Context;
use clap::Parser;
use portfolio_shared::config::DatabaseSettings;
use portfolio_shared::db::migrations::{default_migration_paths, run_all, MigrationReport};
use portfolio_shared::db::pool::connect;
use std::path::{Path, PathBuf};
use tracing::info;

/// Run SQL migration files against the portfolio database
#[derive(Debug, Parser)]
#[command(name = "portfolio-migrate", version, about)]
pub struct Cli {
    /// SQL files to execute, in order
    ///
    /// Defaults to db/migrations/001_init.sql then db/seed/seed.sql
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

impl Cli {
    /// Files to run, falling back to the defaults under `root`
    pub fn migration_paths(&self, root: &Path) -> Vec<PathBuf> {
        if self.files.is_empty() {
            default_migration_paths(root)
        } else {
            self.files.clone()
        }
    }
}

/// Runs the migrate command
///
/// The pool is closed whether or not the migrations succeed.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the database cannot
/// be reached, or any file fails to read or execute.
pub async fn run(cli: Cli) -> anyhow::Result<MigrationReport> {
    let settings = DatabaseSettings::from_env().context("Failed to load configuration")?;

    let handle = connect(&settings)
        .await
        .context("Failed to connect to database")?;

    let root = std::env::current_dir().context("Failed to get working directory")?;
    let paths = cli.migration_paths(&root);

    let result = run_all(&handle, &paths).await;
    handle.close().await;

    let report = result?;
    info!(files = ?report.file_names(), "All migrations completed successfully!");
    Ok(report)
}
