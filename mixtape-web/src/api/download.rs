//! Download pipeline API handlers

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::models::{DownloadJob, DownloadStatus};
use crate::services::download_pipeline::{run_downloads, DownloadContext};
use crate::AppState;

/// POST /download-selected request
#[derive(Debug, Deserialize)]
pub struct DownloadSelectedRequest {
    #[serde(default)]
    pub downloads: Vec<DownloadJob>,
}

/// POST /download-selected response
#[derive(Debug, Serialize)]
pub struct DownloadSelectedResponse {
    pub message: String,
    pub total: usize,
}

/// POST /download-selected
///
/// Validation happens before any state mutation; the idle-to-running
/// transition on the tracker is what makes a second concurrent run
/// impossible.
pub async fn download_selected(
    State(state): State<AppState>,
    Json(request): Json<DownloadSelectedRequest>,
) -> ApiResult<Json<DownloadSelectedResponse>> {
    if request.downloads.is_empty() {
        return Err(ApiError::BadRequest(
            "No songs selected for download".to_string(),
        ));
    }

    let total = request.downloads.len();
    let cancel = state
        .downloads
        .try_start(total)
        .await
        .ok_or_else(|| ApiError::Conflict("Download already in progress".to_string()))?;

    let ctx = DownloadContext {
        download_dir: state.config.download_dir.clone(),
        max_delay_secs: state.config.max_download_delay_secs,
        auto_tag_script: state.config.auto_tag_script.clone(),
        organize_script: state.config.organize_script.clone(),
    };

    tokio::spawn(run_downloads(
        state.ytdlp.clone(),
        state.downloads.clone(),
        ctx,
        request.downloads,
        cancel,
    ));

    Ok(Json(DownloadSelectedResponse {
        message: "Downloads started".to_string(),
        total,
    }))
}

/// GET /download-status
pub async fn get_download_status(State(state): State<AppState>) -> Json<DownloadStatus> {
    Json(state.downloads.snapshot().await)
}

/// POST /download-cancel
pub async fn cancel_download(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    if state.downloads.cancel().await {
        Ok(Json(json!({ "message": "Download run cancelled" })))
    } else {
        Err(ApiError::BadRequest("No download in progress".to_string()))
    }
}

/// Build download routes
pub fn download_routes() -> Router<AppState> {
    Router::new()
        .route("/download-selected", post(download_selected))
        .route("/download-status", get(get_download_status))
        .route("/download-cancel", post(cancel_download))
}
