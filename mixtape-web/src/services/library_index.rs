//! In-memory track catalog loaded from the flat JSON index file.
//!
//! The index is rebuilt wholesale on load; a reload swaps the entire map
//! behind the shared `RwLock`, so readers never observe a partial update.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use mixtape_common::{Result, TrackEntry};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Lookup from normalized "artist - title" key to catalog entry.
#[derive(Debug, Default)]
pub struct LibraryIndex {
    tracks: HashMap<String, TrackEntry>,
}

/// Shared handle the service holds; replaced wholesale on reload.
pub type SharedLibrary = Arc<RwLock<LibraryIndex>>;

impl LibraryIndex {
    /// Load the index from a JSON array of track records.
    ///
    /// A missing file is not an error: the service runs with an empty
    /// catalog and matching simply never succeeds. Entries missing artist,
    /// title, or path are dropped; on duplicate keys the later entry wins.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Music index not found, starting with empty catalog");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<TrackEntry> = serde_json::from_str(&raw)?;

        let total = entries.len();
        let mut tracks = HashMap::new();
        for entry in entries {
            if entry.is_indexable() {
                tracks.insert(entry.key(), entry);
            }
        }

        info!(
            path = %path.display(),
            indexed = tracks.len(),
            scanned = total,
            "Loaded music index"
        );

        Ok(Self { tracks })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Iterate over (normalized key, entry) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TrackEntry)> {
        self.tracks.iter()
    }

    pub fn get(&self, key: &str) -> Option<&TrackEntry> {
        self.tracks.get(key)
    }
}

/// Replace the shared catalog with a freshly loaded one.
///
/// Returns the new track count. The swap happens under the write lock, so
/// concurrent matchers see either the old or the new catalog, never a mix.
pub async fn reload(library: &SharedLibrary, path: &Path) -> Result<usize> {
    let fresh = LibraryIndex::load(path)?;
    let count = fresh.len();
    *library.write().await = fresh;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_index(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_yields_empty_index() {
        let index = LibraryIndex::load(Path::new("/nonexistent/music_index.json")).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn entries_missing_required_fields_are_dropped() {
        let file = write_index(
            r#"[
                {"artist":"The Beatles","title":"Let It Be","path":"/m/b/lib.mp3"},
                {"artist":"","title":"Orphan","path":"/m/orphan.mp3"},
                {"artist":"No Path","title":"Song","path":""},
                {"artist":"Queen","title":"","path":"/m/q.mp3"}
            ]"#,
        );

        let index = LibraryIndex::load(file.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.get("the beatles - let it be").is_some());
    }

    #[test]
    fn later_duplicate_key_overwrites_earlier() {
        let file = write_index(
            r#"[
                {"artist":"ABBA","title":"SOS","path":"/first.mp3"},
                {"artist":"abba","title":"sos","path":"/second.mp3"}
            ]"#,
        );

        let index = LibraryIndex::load(file.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("abba - sos").unwrap().path, "/second.mp3");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let file = write_index("not json at all");
        assert!(LibraryIndex::load(file.path()).is_err());
    }

    #[tokio::test]
    async fn reload_swaps_catalog_atomically() {
        let library: SharedLibrary = Arc::new(RwLock::new(LibraryIndex::default()));
        let file = write_index(r#"[{"artist":"a","title":"t","path":"/p.mp3"}]"#);

        let count = reload(&library, file.path()).await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(library.read().await.len(), 1);

        // Reload from a missing path replaces with an empty catalog
        let count = reload(&library, Path::new("/nonexistent.json")).await.unwrap();
        assert_eq!(count, 0);
        assert!(library.read().await.is_empty());
    }
}
