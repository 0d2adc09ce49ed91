/// Application state and router builder
///
/// This module defines the shared application state, the database bootstrap
/// policy, and the function that builds the Axum router.
///
/// # Example
///
/// ```no_run
/// use portfolio_api::{app::{build_router, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::bootstrap(&config).await;
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::{Config, ServerConfig},
    graphql::{build_schema, PortfolioSchema},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use portfolio_shared::{
    db::pool::{connect, DatabaseHandle},
    models::profile::{DatabaseProfileSource, ProfileSource, StaticProfileSource},
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Where profiles are read from
    pub profiles: Arc<dyn ProfileSource>,

    /// Database handle, absent when running on static data
    pub db: Option<DatabaseHandle>,

    /// GraphQL schema bound to `profiles`
    pub schema: PortfolioSchema,

    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Creates new application state
    pub fn new(
        profiles: Arc<dyn ProfileSource>,
        db: Option<DatabaseHandle>,
        config: ServerConfig,
    ) -> Self {
        Self {
            schema: build_schema(profiles.clone()),
            profiles,
            db,
            config: Arc::new(config),
        }
    }

    /// State serving built-in profile data without a database
    pub fn degraded(config: ServerConfig) -> Self {
        Self::new(Arc::new(StaticProfileSource::new()), None, config)
    }

    /// Connects to the database and picks the profile source
    ///
    /// A connection failure does not stop the server: it is logged and the
    /// state falls back to static profile data.
    pub async fn bootstrap(config: &Config) -> Self {
        match connect(&config.database).await {
            Ok(handle) => {
                info!("Connected to PostgreSQL successfully");
                let source = DatabaseProfileSource::new(handle.clone());
                Self::new(Arc::new(source), Some(handle), config.server.clone())
            }
            Err(e) => {
                warn!(error = %e, "Could not connect to PostgreSQL");
                warn!("Continuing with static profile data");
                Self::degraded(config.server.clone())
            }
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /              # Liveness text
/// ├── GET  /health        # Health check
/// ├── GET  /graphql       # GraphiQL playground, or query-string request
/// ├── POST /graphql       # GraphQL endpoint
/// └── /api/
///     ├── GET /profile    # Primary profile (REST)
///     └── GET /profiles   # All profiles (REST)
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let api_routes = Router::new()
        .route("/profile", get(routes::profile::get_profile))
        .route("/profiles", get(routes::profile::list_profiles));

    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(routes::root::index))
        .route("/health", get(routes::health::health_check))
        .route(
            "/graphql",
            get(routes::graphql::graphql_get).post(routes::graphql::graphql_handler),
        )
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
