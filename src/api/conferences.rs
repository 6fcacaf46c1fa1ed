//! Conference API endpoints.

use axum::{extract::State, http::HeaderMap, Json};

use super::{success, ApiResult};
use crate::auth::caller_from_headers;
use crate::errors::AppError;
use crate::models::{Conference, ConferenceForm};
use crate::AppState;

/// POST /api/conference - Create a conference organized by the caller.
pub async fn create_conference(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<ConferenceForm>,
) -> ApiResult<Conference> {
    let caller = caller_from_headers(&headers);

    // Validate required fields; anonymous callers get the 401 from the service
    if caller.is_some() && form.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }

    let conference = state
        .service
        .create_conference(caller.as_ref(), &form)
        .await?;
    success(conference)
}

/// POST /api/queryConferences - List all conferences ordered by name.
pub async fn query_conferences(State(state): State<AppState>) -> ApiResult<Vec<Conference>> {
    let conferences = state.service.query_conferences().await?;
    success(conferences)
}
