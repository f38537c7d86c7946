//! mixtape-web library interface
//!
//! Exposes the router and application state for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use mixtape_common::config::Config;
use tokio::sync::RwLock;

use crate::services::download_pipeline::DownloadTracker;
use crate::services::library_index::{LibraryIndex, SharedLibrary};
use crate::services::search_pipeline::SearchRegistry;
use crate::services::youtube::YtDlpClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved service configuration
    pub config: Arc<Config>,
    /// In-memory track catalog, swapped wholesale on reload
    pub library: SharedLibrary,
    /// Registry of search runs polled by the UI
    pub searches: SearchRegistry,
    /// Owner of the single download status record
    pub downloads: Arc<DownloadTracker>,
    /// Search/download tool client
    pub ytdlp: Arc<YtDlpClient>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config, library: LibraryIndex) -> Self {
        let ytdlp = Arc::new(YtDlpClient::new(
            config.ytdlp_bin.clone(),
            config.provider_concurrency,
        ));
        Self {
            config: Arc::new(config),
            library: Arc::new(RwLock::new(library)),
            searches: Arc::new(RwLock::new(HashMap::new())),
            downloads: Arc::new(DownloadTracker::new()),
            ytdlp,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::library_routes())
        .merge(api::search_routes())
        .merge(api::download_routes())
        .merge(api::playlist_routes())
        .merge(api::health_routes())
        .with_state(state)
}
