/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for router tests:
/// - Test app construction around any profile source
/// - Profile source doubles (empty, failing)
/// - Request helpers

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use portfolio_api::app::{build_router, AppState};
use portfolio_api::config::ServerConfig;
use portfolio_shared::config::DatabaseSettings;
use portfolio_shared::models::profile::{
    Profile, ProfileError, ProfileSource, ProfileSourceKind, StaticProfileSource,
};
use std::sync::Arc;
use tower::Service as _;

/// Test context holding a router
pub struct TestContext {
    pub app: axum::Router,
}

impl TestContext {
    /// App serving built-in profile data, as after a failed database connect
    pub fn degraded() -> Self {
        Self::with_source(Arc::new(StaticProfileSource::new()))
    }

    /// App serving the given source
    pub fn with_source(source: Arc<dyn ProfileSource>) -> Self {
        Self::from_state(AppState::new(source, None, ServerConfig::default()))
    }

    /// App around prepared state
    pub fn from_state(state: AppState) -> Self {
        Self {
            app: build_router(state),
        }
    }

    /// Sends a request and returns status, headers and body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, body.to_vec())
    }

    /// GET request returning status and parsed JSON
    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, _, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// POSTs a GraphQL query and returns the parsed response
    pub async fn graphql(&self, query: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::json!({ "query": query }).to_string()))
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }
}

/// Database settings pointing at a port nothing listens on
pub fn unreachable_database() -> DatabaseSettings {
    DatabaseSettings::from_lookup(|key| match key {
        "DB_HOST" => Some("127.0.0.1".to_string()),
        "DB_PORT" => Some("1".to_string()),
        "DB_USER" => Some("portfolio".to_string()),
        "DB_PASSWORD" => Some("portfolio".to_string()),
        "DB_NAME" => Some("portfolio".to_string()),
        "DB_MIN_CONNECTIONS" => Some("0".to_string()),
        "DB_ACQUIRE_TIMEOUT_SECONDS" => Some("1".to_string()),
        "DB_CONNECT_TIMEOUT_SECONDS" => Some("1".to_string()),
        _ => None,
    })
    .unwrap()
}

/// Source with no rows, like a database before seeding
pub struct EmptySource;

#[async_trait]
impl ProfileSource for EmptySource {
    fn kind(&self) -> ProfileSourceKind {
        ProfileSourceKind::Database
    }

    async fn profile(&self) -> Result<Option<Profile>, ProfileError> {
        Ok(None)
    }

    async fn profiles(&self) -> Result<Vec<Profile>, ProfileError> {
        Ok(Vec::new())
    }
}

/// Source whose queries always fail
pub struct FailingSource;

#[async_trait]
impl ProfileSource for FailingSource {
    fn kind(&self) -> ProfileSourceKind {
        ProfileSourceKind::Database
    }

    async fn profile(&self) -> Result<Option<Profile>, ProfileError> {
        Err(ProfileError::Database(sqlx::Error::Protocol(
            "relation \"profiles\" does not exist".into(),
        )))
    }

    async fn profiles(&self) -> Result<Vec<Profile>, ProfileError> {
        Err(ProfileError::Database(sqlx::Error::PoolClosed))
    }
}
