//! Serves uploaded avatars and banners from the object store.

use axum::{
    extract::{Path, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use super::{
    AppState,
    errors::{ApiError, ApiResult},
};

/// `GET /files/{*path}`
pub async fn get_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<Response> {
    let object = state
        .objects
        .get(&path)
        .await?
        .ok_or_else(|| ApiError::not_found("File not found"))?;

    Ok((
        [
            (CONTENT_TYPE, object.content_type),
            // Upload paths are unique, so objects never change
            (CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        object.bytes,
    )
        .into_response())
}
