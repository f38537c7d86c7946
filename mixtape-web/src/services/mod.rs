//! Service layer: library index, matching, pipelines, playlists.

pub mod download_pipeline;
pub mod library_index;
pub mod playlists;
pub mod search_pipeline;
pub mod track_matcher;
pub mod youtube;
