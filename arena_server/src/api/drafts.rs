//! Tournament draft handlers, one draft per host.

use arena::tournament::TournamentDraft;
use axum::{Extension, Json, extract::State, http::StatusCode};

use super::{
    AppState,
    errors::{ApiError, ApiResult},
    middleware::AuthUser,
};

/// `GET /drafts`
pub async fn get_draft(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<TournamentDraft>> {
    state
        .tournament_manager
        .get_draft(&user.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No saved draft"))
}

/// `PUT /drafts`
pub async fn save_draft(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(draft): Json<TournamentDraft>,
) -> ApiResult<Json<TournamentDraft>> {
    let draft = state
        .tournament_manager
        .save_draft(&user.user_id, draft)
        .await?;
    Ok(Json(draft))
}

/// `DELETE /drafts`
pub async fn delete_draft(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<StatusCode> {
    state.tournament_manager.delete_draft(&user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
