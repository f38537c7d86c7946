//! mixtape-web - Playlist builder service
//!
//! Takes a pasted "Artist - Title" song list, resolves each line against a
//! locally indexed music library, searches the video platform for the rest,
//! downloads user-approved candidates as audio, and writes `.m3u` playlists
//! referencing local paths.

use anyhow::Result;
use mixtape_common::config::Config;
use mixtape_web::services::library_index::LibraryIndex;
use mixtape_web::{build_router, AppState};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting mixtape-web v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    info!(
        index = %config.music_index_path.display(),
        playlists = %config.playlist_dir.display(),
        downloads = %config.download_dir.display(),
        "Configuration resolved"
    );

    // A broken index degrades to an empty catalog; the service still runs
    let library = match LibraryIndex::load(&config.music_index_path) {
        Ok(library) => library,
        Err(e) => {
            warn!(error = %e, "Music index not loaded - matching disabled until reload");
            LibraryIndex::default()
        }
    };

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config, library);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("mixtape-web listening on http://{bind_addr}");
    info!("Health check: http://{bind_addr}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
