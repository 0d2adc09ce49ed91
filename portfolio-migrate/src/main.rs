//! # Portfolio Migration Runner
//!
//! Applies the schema and seed SQL files to the portfolio database once and
//! exits. Every file is executed on every run; the SQL itself is written to be
//! re-runnable.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p portfolio-migrate
//! cargo run -p portfolio-migrate -- path/to/first.sql path/to/second.sql
//! ```

use clap::Parser;
use portfolio_migrate::cli::{run, Cli};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_migrate=info,portfolio_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Portfolio migrate v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Migration run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
