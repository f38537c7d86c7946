//! Library status and index reload handlers

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::ApiResult;
use crate::services::library_index;
use crate::AppState;

/// GET /library-status response
#[derive(Debug, Serialize)]
pub struct LibraryStatusResponse {
    /// Count of valid indexed tracks
    pub indexed: usize,
    pub library_path: String,
    pub index_path: String,
    pub playlist_dir: String,
    pub download_dir: String,
}

/// POST /reload-index response
#[derive(Debug, Serialize)]
pub struct ReloadIndexResponse {
    pub message: String,
    pub indexed: usize,
}

/// GET /library-status
pub async fn library_status(State(state): State<AppState>) -> Json<LibraryStatusResponse> {
    let indexed = state.library.read().await.len();

    Json(LibraryStatusResponse {
        indexed,
        library_path: state.config.music_root.display().to_string(),
        index_path: state.config.music_index_path.display().to_string(),
        playlist_dir: state.config.playlist_dir.display().to_string(),
        download_dir: state.config.download_dir.display().to_string(),
    })
}

/// POST /reload-index
///
/// Replaces the whole catalog. A missing index file reloads to an empty
/// catalog and still succeeds; an unreadable or malformed file is a 500.
pub async fn reload_index(State(state): State<AppState>) -> ApiResult<Json<ReloadIndexResponse>> {
    let indexed = library_index::reload(&state.library, &state.config.music_index_path).await?;

    Ok(Json(ReloadIndexResponse {
        message: format!("Index reloaded. {indexed} tracks available."),
        indexed,
    }))
}

/// Build library routes
pub fn library_routes() -> Router<AppState> {
    Router::new()
        .route("/library-status", get(library_status))
        .route("/reload-index", post(reload_index))
}
