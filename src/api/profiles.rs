//! Profile API endpoints.

use axum::{extract::State, http::HeaderMap, Json};

use super::{success, ApiResult};
use crate::auth::caller_from_headers;
use crate::errors::AppError;
use crate::models::{Profile, ProfileForm};
use crate::AppState;

/// POST /api/profile - Create or update the caller's profile.
pub async fn save_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<ProfileForm>,
) -> ApiResult<Profile> {
    let caller = caller_from_headers(&headers);
    let profile = state.service.save_profile(caller.as_ref(), &form).await?;
    success(profile)
}

/// GET /api/profile - Get the caller's profile.
pub async fn get_profile(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Profile> {
    let caller = caller_from_headers(&headers);

    match state.service.get_profile(caller.as_ref()).await? {
        Some(profile) => success(profile),
        None => Err(AppError::NotFound("Profile not found".to_string())),
    }
}
