//! Playlist file writing and listing.
//!
//! Playlists are plain `.m3u` files, one path per line, UTF-8. Entries
//! without a resolved path are skipped silently; an existing file of the
//! same name is overwritten.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use mixtape_common::{Error, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::models::ResolvedSource;

/// One playlist as reported by `GET /playlists`.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistInfo {
    pub name: String,
    pub filename: String,
    /// Creation time, ISO 8601
    pub created: String,
    /// File size in bytes
    pub size: u64,
}

/// Sanitize a user-supplied playlist or file name for filesystem use.
///
/// Spaces become underscores; anything outside `[A-Za-z0-9_.-]` is
/// dropped, which also removes path separators.
pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}

/// Default playlist name when the caller supplies none.
pub fn default_playlist_name() -> String {
    format!("playlist_{}", Utc::now().format("%Y%m%d_%H%M%S"))
}

/// Write a playlist and return its path.
///
/// Library paths win over download paths; unresolved entries are skipped.
pub fn write_playlist(dir: &Path, name: &str, songs: &[ResolvedSource]) -> Result<PathBuf> {
    let safe_name = sanitize_name(name);
    if safe_name.is_empty() {
        return Err(Error::InvalidInput(format!(
            "Playlist name unusable after sanitizing: {name:?}"
        )));
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{safe_name}.m3u"));

    let mut contents = String::new();
    for song in songs {
        if let Some(song_path) = song.playlist_path() {
            contents.push_str(song_path);
            contents.push('\n');
        }
    }
    std::fs::write(&path, contents)?;

    info!(path = %path.display(), songs = songs.len(), "Playlist written");
    Ok(path)
}

/// List `.m3u` playlists in the output directory, newest first.
///
/// A missing directory yields an empty list.
pub fn list_playlists(dir: &Path) -> Vec<PlaylistInfo> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut playlists = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("m3u") {
            continue;
        }
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable playlist metadata");
                continue;
            }
        };

        // Epoch fallback when the filesystem exposes neither timestamp,
        // so the field is always valid ISO 8601 and sorts last
        let created = metadata
            .created()
            .or_else(|_| metadata.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
            .to_rfc3339();

        playlists.push(PlaylistInfo {
            name: path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string(),
            filename: path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string(),
            created,
            size: metadata.len(),
        });
    }

    playlists.sort_by(|a, b| b.created.cmp(&a.created));
    playlists
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_spaces_and_drops_separators() {
        assert_eq!(sanitize_name("road trip 2024"), "road_trip_2024");
        assert_eq!(sanitize_name("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_name("mix!@#tape"), "mixtape");
        assert_eq!(sanitize_name("  trimmed  "), "trimmed");
    }

    #[test]
    fn write_skips_unresolved_entries() {
        let dir = tempfile::tempdir().unwrap();
        let songs = vec![
            ResolvedSource::Library("/a.mp3".into()),
            ResolvedSource::Downloaded("/b.mp3".into()),
            ResolvedSource::Unresolved,
        ];

        let path = write_playlist(dir.path(), "mix", &songs).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "/a.mp3\n/b.mp3\n");
    }

    #[test]
    fn write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        write_playlist(dir.path(), "mix", &[ResolvedSource::Library("/old.mp3".into())])
            .unwrap();
        let path = write_playlist(
            dir.path(),
            "mix",
            &[ResolvedSource::Library("/new.mp3".into())],
        )
        .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "/new.mp3\n");
    }

    #[test]
    fn unusable_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_playlist(dir.path(), "!!!", &[]).is_err());
    }

    #[test]
    fn listing_round_trip_surfaces_new_file() {
        let dir = tempfile::tempdir().unwrap();
        write_playlist(
            dir.path(),
            "evening mix",
            &[ResolvedSource::Library("/a.mp3".into())],
        )
        .unwrap();

        let playlists = list_playlists(dir.path());
        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].name, "evening_mix");
        assert_eq!(playlists[0].filename, "evening_mix.m3u");
        assert!(playlists[0].size > 0);
        // Always a parseable timestamp, whatever the filesystem reports
        assert!(DateTime::parse_from_rfc3339(&playlists[0].created).is_ok());
    }

    #[test]
    fn missing_directory_lists_empty() {
        assert!(list_playlists(Path::new("/nonexistent/playlists")).is_empty());
    }
}
