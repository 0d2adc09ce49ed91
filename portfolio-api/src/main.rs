//! # Portfolio API Server
//!
//! Serves the portfolio profile over GraphQL and REST.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - GraphQL endpoint with a GraphiQL playground
//! - REST fallback for the profile
//! - Health check reporting database status
//!
//! When the database cannot be reached at startup, the server keeps running
//! and serves built-in profile data.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p portfolio-api
//! ```

use portfolio_api::{
    app::{build_router, AppState},
    config::Config,
};
use portfolio_shared::db::pool::close_handle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_api=debug,portfolio_shared=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Portfolio API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let state = AppState::bootstrap(&config).await;
    let db = state.db.clone();
    let app = build_router(state);

    let bind_address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    tracing::info!("Server listening on http://{}", bind_address);
    tracing::info!("GraphQL endpoint: http://localhost:{}/graphql", config.server.port);
    tracing::info!("REST profile: http://localhost:{}/api/profile", config.server.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_handle(db.as_ref()).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
