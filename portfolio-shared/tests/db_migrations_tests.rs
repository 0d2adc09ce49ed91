/// Integration tests for the migration runner
///
/// Most tests drive the runner with a recording executor and need no database.
/// The end-to-end test runs against PostgreSQL when `DB_HOST` (and the other
/// `DB_*` variables) are set, and is skipped otherwise.
///
/// Run with: cargo test --test db_migrations_tests -- --test-threads=1

use async_trait::async_trait;
use portfolio_shared::config::DatabaseSettings;
use portfolio_shared::db::migrations::{
    default_migration_paths, run_all, BatchExecutor, MigrationError,
};
use portfolio_shared::db::pool::connect;
use portfolio_shared::models::profile::{DatabaseProfileSource, Profile, ProfileSource};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Records every batch and fails on batches containing a marker
#[derive(Default)]
struct RecordingExecutor {
    calls: Mutex<Vec<String>>,
    fail_marker: Option<&'static str>,
}

impl RecordingExecutor {
    fn failing_on(marker: &'static str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_marker: Some(marker),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchExecutor for RecordingExecutor {
    async fn execute_batch(&self, sql: &str) -> Result<(), sqlx::Error> {
        self.calls.lock().unwrap().push(sql.to_string());

        match self.fail_marker {
            Some(marker) if sql.contains(marker) => {
                Err(sqlx::Error::Protocol(format!("syntax error near {marker}")))
            }
            _ => Ok(()),
        }
    }
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn test_runs_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(dir.path(), "a.sql", "CREATE TABLE a (id INT);");
    let b = write_file(dir.path(), "b.sql", "CREATE TABLE b (id INT);");
    let c = write_file(dir.path(), "c.sql", "CREATE TABLE c (id INT);");

    let executor = RecordingExecutor::default();
    let report = run_all(&executor, &[a, b, c]).await.unwrap();

    assert_eq!(
        executor.calls(),
        vec![
            "CREATE TABLE a (id INT);",
            "CREATE TABLE b (id INT);",
            "CREATE TABLE c (id INT);",
        ]
    );
    assert_eq!(report.file_names(), vec!["a.sql", "b.sql", "c.sql"]);
    assert_eq!(
        report.applied.iter().map(|f| f.ordinal).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[tokio::test]
async fn test_stops_at_first_execution_failure() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(dir.path(), "a.sql", "SELECT 'a';");
    let b = write_file(dir.path(), "b.sql", "SELEC broken;");
    let c = write_file(dir.path(), "c.sql", "SELECT 'c';");

    let executor = RecordingExecutor::failing_on("broken");
    let result = run_all(&executor, &[a, b.clone(), c]).await;

    match result {
        Err(MigrationError::Execution { path, .. }) => assert_eq!(path, b),
        other => panic!("Expected execution error, got {:?}", other),
    }

    // C was never sent to the database
    assert_eq!(executor.calls(), vec!["SELECT 'a';", "SELEC broken;"]);
}

#[tokio::test]
async fn test_missing_file_stops_run() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(dir.path(), "a.sql", "SELECT 1;");
    let missing = dir.path().join("missing.sql");
    let c = write_file(dir.path(), "c.sql", "SELECT 3;");

    let executor = RecordingExecutor::default();
    let err = run_all(&executor, &[a, missing.clone(), c])
        .await
        .unwrap_err();

    assert!(matches!(err, MigrationError::FileRead { .. }));
    assert_eq!(err.path(), missing.as_path());
    assert_eq!(executor.calls(), vec!["SELECT 1;"]);
}

#[tokio::test]
async fn test_content_reaches_executor_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let contents = "-- header comment\nCREATE TABLE t (id INT);\n\nINSERT INTO t VALUES (1); INSERT INTO t VALUES (2);\n";
    let path = write_file(dir.path(), "multi.sql", contents);

    let executor = RecordingExecutor::default();
    run_all(&executor, &[path]).await.unwrap();

    // One batch, not split into statements
    assert_eq!(executor.calls(), vec![contents.to_string()]);
}

#[tokio::test]
async fn test_empty_file_list() {
    let executor = RecordingExecutor::default();
    let paths: Vec<PathBuf> = Vec::new();

    let report = run_all(&executor, &paths).await.unwrap();

    assert!(report.applied.is_empty());
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_rerun_executes_everything_again() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(dir.path(), "a.sql", "CREATE TABLE IF NOT EXISTS a (id INT);");

    let executor = RecordingExecutor::default();
    run_all(&executor, &[a.clone()]).await.unwrap();
    run_all(&executor, &[a]).await.unwrap();

    assert_eq!(executor.calls().len(), 2);
}

#[tokio::test]
async fn test_bundled_migrations_exist() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let executor = RecordingExecutor::default();

    let report = run_all(&executor, &default_migration_paths(&root))
        .await
        .unwrap();

    assert_eq!(report.file_names(), vec!["001_init.sql", "seed.sql"]);
    assert!(executor.calls()[0].contains("CREATE TABLE IF NOT EXISTS profiles"));
    assert!(executor.calls()[1].contains("INSERT INTO profiles"));
}

/// Connects to the test database, or returns None when none is configured
async fn test_handle() -> Option<portfolio_shared::db::pool::DatabaseHandle> {
    if std::env::var("DB_HOST").is_err() {
        eprintln!("DB_HOST not set, skipping database test");
        return None;
    }

    let settings = DatabaseSettings::from_env().expect("Invalid test database settings");
    Some(connect(&settings).await.expect("Failed to connect to test database"))
}

#[tokio::test]
async fn test_end_to_end_against_database() {
    let Some(handle) = test_handle().await else {
        return;
    };

    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let paths = default_migration_paths(&root);

    // First run creates and seeds
    let report = run_all(&handle, &paths).await.expect("First run failed");
    assert_eq!(report.applied.len(), 2);

    // Second run succeeds because the SQL is re-runnable
    run_all(&handle, &paths).await.expect("Second run failed");

    let source = DatabaseProfileSource::new(handle.clone());
    let profile = source.profile().await.unwrap();
    assert_eq!(profile, Some(Profile::fallback()));

    let profiles = source.profiles().await.unwrap();
    assert_eq!(profiles.iter().filter(|p| p.id == 1).count(), 1);

    handle.close().await;
    handle.close().await;
}

#[tokio::test]
async fn test_database_execution_error_is_reported() {
    let Some(handle) = test_handle().await else {
        return;
    };

    let dir = tempfile::tempdir().unwrap();
    let bad = write_file(dir.path(), "bad.sql", "THIS IS NOT SQL;");

    let err = run_all(&handle, &[bad.clone()]).await.unwrap_err();
    assert!(matches!(err, MigrationError::Execution { .. }));
    assert_eq!(err.path(), bad.as_path());

    handle.close().await;
}
