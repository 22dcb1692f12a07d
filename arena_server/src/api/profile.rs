//! Profile API handlers.

use arena::profile::{Availability, ProfileUpdate, UserProfile};
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
};
use serde::Deserialize;

use super::{AppState, errors::ApiResult, middleware::AuthUser, tournaments::content_type};

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub ign: Option<String>,
    pub game_id: Option<String>,
}

/// `GET /profile`
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<UserProfile>> {
    let profile = state.profile_manager.get_profile(&user.user_id).await?;
    Ok(Json(profile))
}

/// `PUT /profile`
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<UserProfile>> {
    let profile = state
        .profile_manager
        .update_profile(&user.user_id, update)
        .await?;
    Ok(Json(profile))
}

/// `GET /profile/availability?ign=&game_id=`
///
/// The caller's own IGN and game ID count as available.
pub async fn check_availability(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<Availability>> {
    let availability = state
        .profile_manager
        .check_availability(&user.user_id, query.ign.as_deref(), query.game_id.as_deref())
        .await?;
    Ok(Json(availability))
}

/// `POST /profile/avatar`: raw image body
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<UserProfile>> {
    let profile = state
        .profile_manager
        .upload_avatar(&user.user_id, &content_type(&headers), body.to_vec())
        .await?;
    Ok(Json(profile))
}
