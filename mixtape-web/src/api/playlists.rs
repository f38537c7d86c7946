//! Playlist API handlers

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::models::ResolvedSource;
use crate::services::playlists::{
    default_playlist_name, list_playlists, sanitize_name, write_playlist, PlaylistInfo,
};
use crate::AppState;

/// POST /create-playlist request
#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    #[serde(default)]
    pub playlist_name: Option<String>,
    #[serde(default)]
    pub songs: Vec<ResolvedSource>,
}

/// POST /create-playlist response
#[derive(Debug, Serialize)]
pub struct CreatePlaylistResponse {
    pub message: String,
    pub path: String,
}

/// GET /playlists
pub async fn playlists(State(state): State<AppState>) -> Json<Vec<PlaylistInfo>> {
    Json(list_playlists(&state.config.playlist_dir))
}

/// GET /playlist/:filename
///
/// Raw file download. The name is sanitized before touching the
/// filesystem, so traversal components never reach the directory join.
pub async fn download_playlist(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let safe = sanitize_name(&filename);
    let path = state.config.playlist_dir.join(&safe);
    if safe.is_empty() || !path.is_file() {
        return Err(ApiError::NotFound(format!("Playlist not found: {filename}")));
    }

    let contents = std::fs::read_to_string(&path)?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/x-mpegurl".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{safe}\""),
            ),
        ],
        contents,
    )
        .into_response())
}

/// POST /create-playlist
pub async fn create_playlist(
    State(state): State<AppState>,
    Json(request): Json<CreatePlaylistRequest>,
) -> ApiResult<Json<CreatePlaylistResponse>> {
    if request.songs.is_empty() {
        return Err(ApiError::BadRequest("No songs selected".to_string()));
    }

    let name = request
        .playlist_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(default_playlist_name);

    let path = write_playlist(&state.config.playlist_dir, &name, &request.songs).map_err(
        |e| match e {
            mixtape_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::from(other),
        },
    )?;

    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    Ok(Json(CreatePlaylistResponse {
        message: format!("Playlist created: {filename}"),
        path: path.display().to_string(),
    }))
}

/// Build playlist routes
pub fn playlist_routes() -> Router<AppState> {
    Router::new()
        .route("/playlists", get(playlists))
        .route("/playlist/:filename", get(download_playlist))
        .route("/create-playlist", post(create_playlist))
}
