//! HTTP API handlers for mixtape-web

pub mod download;
pub mod health;
pub mod library;
pub mod playlists;
pub mod search;
pub mod ui;

pub use download::download_routes;
pub use health::health_routes;
pub use library::library_routes;
pub use playlists::playlist_routes;
pub use search::search_routes;
pub use ui::ui_routes;
