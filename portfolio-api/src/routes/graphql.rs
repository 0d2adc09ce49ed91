/// GraphQL endpoints
///
/// # Endpoints
///
/// - `POST /graphql` - Execute a GraphQL request
/// - `GET /graphql?query=...` - Execute a GraphQL request from the query string
/// - `GET /graphql` - GraphiQL playground
///
/// # Example
///
/// ```text
/// POST /graphql
/// {"query": "{ profile { name title } }"}
///
/// GET /graphql?query={profile{name}}
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use async_graphql::http::{parse_query_string, GraphiQLSource};
use axum::{
    extract::{RawQuery, State},
    response::{Html, IntoResponse, Response},
    Json,
};

/// Executes a GraphQL request against the schema
pub async fn graphql_handler(
    State(state): State<AppState>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(state.schema.execute(request).await)
}

/// Executes a query-string request, or serves GraphiQL when there is none
///
/// # Errors
///
/// Returns 400 if a `query` parameter is present but the request cannot be
/// parsed (for example malformed `variables`).
pub async fn graphql_get(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Response> {
    let Some(raw) = raw.filter(|raw| has_query_param(raw)) else {
        return Ok(graphiql().await.into_response());
    };

    let request = parse_query_string(&raw)
        .map_err(|e| ApiError::BadRequest(format!("Invalid GraphQL request: {}", e)))?;

    Ok(Json(state.schema.execute(request).await).into_response())
}

/// Serves the GraphiQL playground
pub async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

fn has_query_param(raw: &str) -> bool {
    raw.split('&').any(|pair| pair.split('=').next() == Some("query"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_query_param() {
        assert!(has_query_param("query=%7Bprofile%7Bname%7D%7D"));
        assert!(has_query_param("operationName=Q&query=x"));
        assert!(!has_query_param("queryx=1"));
        assert!(!has_query_param(""));
    }
}
