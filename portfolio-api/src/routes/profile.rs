/// REST profile endpoints
///
/// Fallback for clients that do not speak GraphQL. Both endpoints read from the
/// same profile source as the GraphQL schema.
///
/// # Endpoints
///
/// - `GET /api/profile` - Primary profile
/// - `GET /api/profiles` - All profiles
///
/// # Response
///
/// ```json
/// {
///   "id": 1,
///   "name": "Likhith Vardhan",
///   "title": "Software Developer",
///   "description": "Passionate about creating innovative solutions with cutting-edge technology."
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use portfolio_shared::models::profile::Profile;

/// Returns the primary profile
///
/// # Errors
///
/// - 404 if the profile does not exist
/// - 500/503 if the database query fails
pub async fn get_profile(State(state): State<AppState>) -> ApiResult<Json<Profile>> {
    let profile = state
        .profiles
        .profile()
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    Ok(Json(profile))
}

/// Returns all profiles
pub async fn list_profiles(State(state): State<AppState>) -> ApiResult<Json<Vec<Profile>>> {
    Ok(Json(state.profiles.profiles().await?))
}
