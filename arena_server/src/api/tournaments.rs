//! Tournament API handlers.
//!
//! Listing is public. Everything else needs a bearer token; host-only
//! operations (status, room, results, banner) are checked by the manager.
//! Room credentials are stripped from every response unless the caller is
//! the host or a participant.

use arena::tournament::{
    NewTournament, RoomDetails, Tournament, TournamentResults, TournamentStatus,
};
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
};
use serde::Deserialize;

use super::{AppState, errors::ApiResult, middleware::AuthUser};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: TournamentStatus,
}

#[derive(Debug, Deserialize)]
pub struct CompletePayload {
    pub results: TournamentResults,
}

fn visible(tournaments: Vec<Tournament>, viewer: Option<&str>) -> Vec<Tournament> {
    tournaments
        .iter()
        .map(|tournament| tournament.visible_to(viewer))
        .collect()
}

/// Content type of an upload body, without parameters
pub(crate) fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// `GET /tournaments?status=`
pub async fn list_tournaments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Tournament>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<TournamentStatus>)
        .transpose()?;

    let tournaments = state.tournament_manager.list_tournaments(status).await?;
    Ok(Json(visible(tournaments, None)))
}

/// `GET /tournaments/hosted`
pub async fn list_hosted(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Tournament>>> {
    let tournaments = state
        .tournament_manager
        .list_hosted_by(&user.user_id)
        .await?;
    Ok(Json(visible(tournaments, Some(&user.user_id))))
}

/// `GET /tournaments/joined`
pub async fn list_joined(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Tournament>>> {
    let tournaments = state
        .tournament_manager
        .list_joined_by(&user.user_id)
        .await?;
    Ok(Json(visible(tournaments, Some(&user.user_id))))
}

/// `GET /tournaments/{id}`
pub async fn get_tournament(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tournament_id): Path<String>,
) -> ApiResult<Json<Tournament>> {
    let tournament = state
        .tournament_manager
        .get_tournament(&tournament_id)
        .await?;
    Ok(Json(tournament.visible_to(Some(&user.user_id))))
}

/// `POST /tournaments`
pub async fn create_tournament(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<NewTournament>,
) -> ApiResult<(StatusCode, Json<Tournament>)> {
    let tournament = state
        .tournament_manager
        .create_tournament(&user.user_id, payload)
        .await?;
    metrics::tournaments_created_total();
    Ok((StatusCode::CREATED, Json(tournament)))
}

/// `POST /tournaments/{id}/join`
pub async fn join_tournament(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tournament_id): Path<String>,
) -> ApiResult<Json<Tournament>> {
    let result = state
        .tournament_manager
        .join_tournament(&tournament_id, &user.user_id)
        .await;
    metrics::tournament_joins_total(result.is_ok());
    Ok(Json(result?.visible_to(Some(&user.user_id))))
}

/// `POST /tournaments/{id}/leave`
pub async fn leave_tournament(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tournament_id): Path<String>,
) -> ApiResult<Json<Tournament>> {
    let tournament = state
        .tournament_manager
        .leave_tournament(&tournament_id, &user.user_id)
        .await?;
    Ok(Json(tournament.visible_to(Some(&user.user_id))))
}

/// `POST /tournaments/{id}/status`
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tournament_id): Path<String>,
    Json(payload): Json<StatusPayload>,
) -> ApiResult<Json<Tournament>> {
    let tournament = state
        .tournament_manager
        .update_status(&tournament_id, &user.user_id, payload.status)
        .await?;
    Ok(Json(tournament))
}

/// `PUT /tournaments/{id}/room`
pub async fn set_room(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tournament_id): Path<String>,
    Json(room): Json<RoomDetails>,
) -> ApiResult<Json<Tournament>> {
    let tournament = state
        .tournament_manager
        .set_room_details(&tournament_id, &user.user_id, room)
        .await?;
    Ok(Json(tournament))
}

/// `POST /tournaments/{id}/complete`: record results and pay prizes
pub async fn complete_tournament(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tournament_id): Path<String>,
    Json(payload): Json<CompletePayload>,
) -> ApiResult<Json<Tournament>> {
    let tournament = state
        .tournament_manager
        .complete_tournament(&tournament_id, &user.user_id, payload.results)
        .await?;
    Ok(Json(tournament))
}

/// `POST /tournaments/{id}/banner`: raw image body
pub async fn upload_banner(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tournament_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Tournament>> {
    let tournament = state
        .tournament_manager
        .upload_banner(
            &tournament_id,
            &user.user_id,
            &content_type(&headers),
            body.to_vec(),
        )
        .await?;
    Ok(Json(tournament))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_content_type_strips_parameters() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/png; charset=binary"));
        assert_eq!(content_type(&headers), "image/png");

        assert_eq!(content_type(&HeaderMap::new()), "");
    }
}
