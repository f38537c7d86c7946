//! Track catalog types shared between the web service and the indexer.

use serde::{Deserialize, Serialize};

/// One entry in the music index file.
///
/// The index is a flat JSON array of these records. Entries are immutable
/// once loaded; a reload replaces the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEntry {
    /// Artist name as tagged in the file
    #[serde(default)]
    pub artist: String,
    /// Track title as tagged in the file
    #[serde(default)]
    pub title: String,
    /// Absolute path to the audio file
    #[serde(default)]
    pub path: String,
    /// Album name, when the tags carry one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Release year (4 characters), when the tags carry one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl TrackEntry {
    /// An entry is indexable only with non-empty artist, title and path.
    pub fn is_indexable(&self) -> bool {
        !self.artist.trim().is_empty()
            && !self.title.trim().is_empty()
            && !self.path.trim().is_empty()
    }

    /// Normalized lookup key for this entry.
    pub fn key(&self) -> String {
        track_key(&self.artist, &self.title)
    }
}

/// Build the normalized catalog key: `lower(trim(artist)) - lower(trim(title))`.
///
/// Case- and surrounding-whitespace-insensitive; identical normalization is
/// applied on index build and on lookup so the two always agree.
pub fn track_key(artist: &str, title: &str) -> String {
    format!(
        "{} - {}",
        artist.trim().to_lowercase(),
        title.trim().to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_case_and_whitespace_insensitive() {
        assert_eq!(
            track_key("  The Beatles ", "Let It Be"),
            "the beatles - let it be"
        );
        assert_eq!(track_key("ABBA", "SOS"), track_key("abba", "sos"));
    }

    #[test]
    fn entry_key_matches_free_function() {
        let entry = TrackEntry {
            artist: "Queen".into(),
            title: " Bohemian Rhapsody ".into(),
            path: "/music/queen/br.mp3".into(),
            album: None,
            year: None,
        };
        assert_eq!(entry.key(), track_key("Queen", "Bohemian Rhapsody"));
    }

    #[test]
    fn indexable_requires_all_three_fields() {
        let mut entry = TrackEntry {
            artist: "Queen".into(),
            title: "Under Pressure".into(),
            path: "/music/q/up.flac".into(),
            album: Some("Hot Space".into()),
            year: Some("1982".into()),
        };
        assert!(entry.is_indexable());

        entry.path = "  ".into();
        assert!(!entry.is_indexable());

        entry.path = "/music/q/up.flac".into();
        entry.artist = String::new();
        assert!(!entry.is_indexable());
    }

    #[test]
    fn deserializes_with_missing_optional_fields() {
        let entry: TrackEntry =
            serde_json::from_str(r#"{"artist":"a","title":"t","path":"/p"}"#).unwrap();
        assert_eq!(entry.album, None);
        assert_eq!(entry.year, None);
        assert!(entry.is_indexable());
    }
}
