//! Search pipeline API handlers
//!
//! POST /search-songs starts a background run and returns its id at once;
//! GET /search-results/:id is polled until the run reaches a terminal
//! state.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::search_pipeline::{spawn_search, RunState};
use crate::AppState;

/// POST /search-songs request
#[derive(Debug, Deserialize)]
pub struct SearchSongsRequest {
    #[serde(default)]
    pub song_list: String,
}

/// POST /search-songs response
#[derive(Debug, Serialize)]
pub struct SearchSongsResponse {
    pub search_id: Uuid,
    pub message: String,
}

/// POST /search-songs
///
/// Accepts the song list and spawns the pipeline. 202-style: results are
/// not ready when this returns.
pub async fn search_songs(
    State(state): State<AppState>,
    Json(request): Json<SearchSongsRequest>,
) -> ApiResult<(StatusCode, Json<SearchSongsResponse>)> {
    if request.song_list.trim().is_empty() {
        return Err(ApiError::BadRequest("No songs provided".to_string()));
    }

    let search_id = spawn_search(
        state.searches.clone(),
        state.ytdlp.clone(),
        state.library.clone(),
        request.song_list,
        state.config.search_pacing,
    )
    .await;

    Ok((
        StatusCode::ACCEPTED,
        Json(SearchSongsResponse {
            search_id,
            message: "Search started".to_string(),
        }),
    ))
}

/// GET /search-results/:search_id
///
/// Unknown ids are a 404; a registered run always answers with
/// processing, complete, failed, or cancelled.
pub async fn get_search_results(
    State(state): State<AppState>,
    Path(search_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let registry = state.searches.read().await;
    let run = registry
        .get(&search_id)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown search run: {search_id}")))?;

    let body = match &run.state {
        RunState::Pending => json!({ "status": "processing" }),
        RunState::Complete(results) => json!({ "status": "complete", "results": results }),
        RunState::Failed(message) => json!({ "status": "failed", "error": message }),
        RunState::Cancelled => json!({ "status": "cancelled" }),
    };

    Ok(Json(body))
}

/// POST /search-cancel/:search_id
pub async fn cancel_search(
    State(state): State<AppState>,
    Path(search_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let registry = state.searches.read().await;
    let run = registry
        .get(&search_id)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown search run: {search_id}")))?;

    match run.state {
        RunState::Pending => {
            run.cancel.cancel();
            Ok(Json(json!({ "message": "Search cancelled" })))
        }
        _ => Err(ApiError::BadRequest(
            "Search run already finished".to_string(),
        )),
    }
}

/// Build search routes
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/search-songs", post(search_songs))
        .route("/search-results/:search_id", get(get_search_results))
        .route("/search-cancel/:search_id", post(cancel_search))
}
