//! Wire and pipeline types for the search/select/download workflow.

use mixtape_common::TrackEntry;
use serde::{Deserialize, Serialize};

/// How a song line resolved against the library and the search provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// A catalog entry scored above the match threshold
    InLibrary,
    /// No library match, but the provider returned candidates
    Found,
    /// No library match and no candidates
    NotFound,
    /// The line carried no " - " separator
    InvalidFormat,
    /// Wire taxonomy only: per-line provider failures degrade to
    /// `not_found` (or `in_library`) with no candidates
    Error,
}

/// One provider search result a user can pick for download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub uploader: Option<String>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    /// Truncated to 200 characters with an ellipsis marker
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub upload_date: Option<String>,
}

/// Aggregated outcome for one input line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The line as the user typed it
    pub original: String,
    pub artist: String,
    pub title: String,
    pub status: ResolutionStatus,
    pub library_match: Option<TrackEntry>,
    pub candidates: Vec<CandidateItem>,
}

impl SearchResult {
    /// Result for a line with no separator; no network calls were made.
    pub fn invalid(line: &str) -> Self {
        Self {
            original: line.to_string(),
            artist: String::new(),
            title: line.to_string(),
            status: ResolutionStatus::InvalidFormat,
            library_match: None,
            candidates: Vec::new(),
        }
    }
}

/// A user-approved candidate queued for download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadJob {
    pub artist: String,
    pub title: String,
    pub youtube_url: String,
}

/// Process-wide download progress record, overwritten in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadStatus {
    pub running: bool,
    pub progress: String,
    pub complete: bool,
    pub current_song: String,
    pub downloaded: usize,
    pub total: usize,
}

/// Where a playlist entry's audio lives.
///
/// Wire format stays duck-typed for the UI (`library_path` /
/// `download_path` / neither), the service works with the tagged variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSource", into = "RawSource")]
pub enum ResolvedSource {
    Library(String),
    Downloaded(String),
    Unresolved,
}

impl ResolvedSource {
    /// The path written to the playlist, if any. Library wins over download.
    pub fn playlist_path(&self) -> Option<&str> {
        match self {
            ResolvedSource::Library(path) | ResolvedSource::Downloaded(path) => Some(path),
            ResolvedSource::Unresolved => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    library_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    download_path: Option<String>,
}

impl From<RawSource> for ResolvedSource {
    fn from(raw: RawSource) -> Self {
        match (raw.library_path, raw.download_path) {
            (Some(path), _) if !path.is_empty() => ResolvedSource::Library(path),
            (_, Some(path)) if !path.is_empty() => ResolvedSource::Downloaded(path),
            _ => ResolvedSource::Unresolved,
        }
    }
}

impl From<ResolvedSource> for RawSource {
    fn from(source: ResolvedSource) -> Self {
        match source {
            ResolvedSource::Library(path) => RawSource {
                library_path: Some(path),
                download_path: None,
            },
            ResolvedSource::Downloaded(path) => RawSource {
                library_path: None,
                download_path: Some(path),
            },
            ResolvedSource::Unresolved => RawSource {
                library_path: None,
                download_path: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ResolutionStatus::InLibrary).unwrap(),
            r#""in_library""#
        );
        assert_eq!(
            serde_json::to_string(&ResolutionStatus::InvalidFormat).unwrap(),
            r#""invalid_format""#
        );
    }

    #[test]
    fn resolved_source_from_wire_shapes() {
        let library: ResolvedSource =
            serde_json::from_str(r#"{"library_path":"/a.mp3"}"#).unwrap();
        assert_eq!(library, ResolvedSource::Library("/a.mp3".into()));

        let downloaded: ResolvedSource =
            serde_json::from_str(r#"{"download_path":"/b.mp3"}"#).unwrap();
        assert_eq!(downloaded, ResolvedSource::Downloaded("/b.mp3".into()));

        let unresolved: ResolvedSource = serde_json::from_str("{}").unwrap();
        assert_eq!(unresolved, ResolvedSource::Unresolved);
        assert_eq!(unresolved.playlist_path(), None);
    }

    #[test]
    fn library_path_wins_when_both_present() {
        let both: ResolvedSource =
            serde_json::from_str(r#"{"library_path":"/a.mp3","download_path":"/b.mp3"}"#)
                .unwrap();
        assert_eq!(both.playlist_path(), Some("/a.mp3"));
    }
}
